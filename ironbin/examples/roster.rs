//! Example encoding a team roster and reading it back.
//!
//! Run with: `RUST_LOG=debug cargo run --example roster`

use ironbin::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, BinaryEnum)]
enum Role {
    Keeper,
    Defender,
    Forward,
}

#[derive(Debug, Default, Clone, PartialEq, BinarySerialize)]
#[binary(version = 2)]
struct Contact {
    email: String,
    phone: String,
}

#[derive(Debug, Default, Clone, PartialEq, BinarySerialize)]
#[binary(version = 3)]
struct Player {
    name: String,
    number: i16,
    role: Option<Role>,
    contact: Contact,
    #[binary(exclude)]
    notes: String,
}

fn print_hex(label: &str, bytes: &[u8]) {
    let hex: Vec<String> = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    println!("{} ({} bytes): {}", label, bytes.len(), hex.join(" "));
}

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let roster = vec![
        Player {
            name: "Zoë".into(),
            number: 1,
            role: Some(Role::Keeper),
            contact: Contact {
                email: "zoe@club.example".into(),
                phone: "555-0101".into(),
            },
            notes: "captain".into(),
        },
        Player {
            name: "Ravi".into(),
            number: 9,
            role: Some(Role::Forward),
            contact: Contact::default(),
            notes: String::new(),
        },
        Player {
            name: "Kim".into(),
            number: 4,
            role: None,
            contact: Contact {
                email: "kim@club.example".into(),
                phone: String::new(),
            },
            notes: "injured".into(),
        },
    ];

    for policy in [NestedVersioning::EveryLevel, NestedVersioning::TopLevelOnly] {
        let codec = BinaryCodec::builder()
            .nested_versioning(policy)
            .buffer_capacity(1024)
            .build();
        println!("\n=== {:?} ===", policy);

        let mut buffer = ByteCursorBuffer::new(codec.config().buffer_capacity);
        for player in &roster {
            let written = codec.serialize_into(player, &mut buffer)?;
            tracing::info!("Encoded {} in {} bytes", player.name, written);
        }
        print_hex("roster", buffer.written());

        for expected in &roster {
            let decoded: Player = codec.deserialize(&mut buffer)?;
            println!(
                "#{:<2} {:<6} {:<10} {:<20} notes={:?}",
                decoded.number,
                decoded.name,
                format!("{:?}", decoded.role),
                decoded.contact.email,
                decoded.notes
            );
            assert_eq!(decoded.name, expected.name);
        }
    }

    // A reader built for a newer layout rejects the stream
    let bytes = ironbin::to_vec(&roster[0])?;
    let mut tampered = bytes.clone();
    tampered[1] = 4;
    match ironbin::deserialize::<Player>(&tampered) {
        Ok(_) => println!("\nunexpected success"),
        Err(e) => println!("\nrejected tampered stream: {}", e),
    }

    Ok(())
}
