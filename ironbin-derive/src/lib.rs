//! # IronBin Derive
//!
//! Procedural macros for IronBin record definitions.
//!
//! `#[derive(BinarySerialize)]` generates the static schema table of a struct
//! together with the field walkers the codec drives, and an implementation
//! of `BinaryField` so the struct can be nested in other records.
//! `#[derive(BinaryEnum)]` maps a fieldless enum to zero-based ordinals.
//!
//! Generated code refers to the `ironbin` facade crate by absolute path.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, LitInt, LitStr, Member, Type, parse_macro_input};

/// Derives `BinarySerialize` and `BinaryField` for a struct.
///
/// # Attributes
/// * `#[binary(version = N)]` - schema version written as the leading i16
///   tag (default `0`)
/// * `#[binary(exclude)]` on the struct - the type refuses to serialize
/// * `#[binary(no_default)]` on the struct - do not require `Default`;
///   the type decodes only into an existing value, either through
///   `deserialize_into` or as a field of a record being decoded
/// * `#[binary(exclude)]` on a field - the field is neither written nor
///   read and keeps its default value on decode
/// * `#[binary(rename = "...")]` on a field - name reported in the schema
///   and in errors
///
/// # Example
/// ```ignore
/// #[derive(Default, BinarySerialize)]
/// #[binary(version = 3)]
/// struct Player {
///     name: String,
///     #[binary(rename = "player_id")]
///     id: i32,
///     kind: Option<Color>,
///     #[binary(exclude)]
///     cache: Vec<u8>,
/// }
/// ```
#[proc_macro_derive(BinarySerialize, attributes(binary))]
pub fn derive_binary_serialize(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_record(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derives `BinaryEnum` for a fieldless enum.
///
/// Ordinals follow declaration order starting at zero. The enum must also be
/// `Copy`.
///
/// # Example
/// ```ignore
/// #[derive(Debug, Clone, Copy, BinaryEnum)]
/// enum Color {
///     Red,
///     Green,
///     Blue,
/// }
/// ```
#[proc_macro_derive(BinaryEnum)]
pub fn derive_binary_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_enum(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[derive(Default)]
struct RecordAttrs {
    version: i16,
    excluded: bool,
    no_default: bool,
}

impl RecordAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("binary")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("version") {
                    let lit: LitInt = meta.value()?.parse()?;
                    parsed.version = lit.base10_parse()?;
                    Ok(())
                } else if meta.path.is_ident("exclude") {
                    parsed.excluded = true;
                    Ok(())
                } else if meta.path.is_ident("no_default") {
                    parsed.no_default = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `version`, `exclude` or `no_default`"))
                }
            })?;
        }
        Ok(parsed)
    }
}

struct FieldInfo {
    member: Member,
    name: String,
    ty: Type,
    excluded: bool,
}

impl FieldInfo {
    fn parse(index: usize, field: &syn::Field) -> syn::Result<Self> {
        let member = match &field.ident {
            Some(ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(index.into()),
        };
        let mut name = match &member {
            Member::Named(ident) => ident.to_string(),
            Member::Unnamed(idx) => idx.index.to_string(),
        };
        let mut excluded = false;
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("binary")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("exclude") {
                    excluded = true;
                    Ok(())
                } else if meta.path.is_ident("rename") {
                    let lit: LitStr = meta.value()?.parse()?;
                    name = lit.value();
                    Ok(())
                } else {
                    Err(meta.error("expected `exclude` or `rename`"))
                }
            })?;
        }
        Ok(Self {
            member,
            name,
            ty: field.ty.clone(),
            excluded,
        })
    }
}

fn expand_record(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "BinarySerialize cannot be derived for generic types",
        ));
    }
    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "BinarySerialize can only be derived for structs",
            ));
        }
    };

    let attrs = RecordAttrs::parse(&input.attrs)?;
    let mut infos = Vec::new();
    if let Fields::Named(_) | Fields::Unnamed(_) = fields {
        for (index, field) in fields.iter().enumerate() {
            let mut info = FieldInfo::parse(index, field)?;
            info.excluded |= attrs.excluded;
            infos.push(info);
        }
    }

    let schema_name = ident.to_string();
    let version = attrs.version;
    let excluded = attrs.excluded;

    let descriptors = infos.iter().map(|info| {
        let name = &info.name;
        let ty = &info.ty;
        let type_name = type_name(ty);
        if info.excluded {
            quote! { ::ironbin::FieldDescriptor::excluded(#name, #type_name) }
        } else {
            quote! {
                ::ironbin::FieldDescriptor::declared(
                    #name,
                    <#ty as ::ironbin::BinaryField>::FIELD_TYPE,
                    #type_name,
                )
            }
        }
    });

    let encoded: Vec<_> = infos
        .iter()
        .enumerate()
        .filter(|(_, info)| !info.excluded)
        .collect();
    let encodes = encoded.iter().map(|(index, info)| {
        let member = &info.member;
        quote! { enc.field(&Self::SCHEMA.fields[#index], &self.#member)?; }
    });
    let decodes = encoded.iter().map(|(index, info)| {
        let member = &info.member;
        quote! { dec.field_into(&Self::SCHEMA.fields[#index], &mut self.#member)?; }
    });
    let lens = encoded.iter().map(|(_, info)| {
        let member = &info.member;
        quote! { + ::ironbin::BinaryField::encoded_len(&self.#member, nested) }
    });

    let instantiate = if excluded || attrs.no_default {
        quote! {}
    } else {
        quote! {
            fn instantiate() -> ::ironbin::Result<Self> {
                Ok(<Self as ::core::default::Default>::default())
            }
        }
    };

    Ok(quote! {
        impl ::ironbin::BinarySerialize for #ident {
            const SCHEMA: &'static ::ironbin::Schema = &::ironbin::Schema {
                name: #schema_name,
                version: #version,
                excluded: #excluded,
                fields: &[#(#descriptors),*],
            };

            #[allow(unused_variables)]
            fn encode_fields(&self, enc: &mut ::ironbin::Encoder<'_>) -> ::ironbin::Result<()> {
                #(#encodes)*
                Ok(())
            }

            #[allow(unused_variables)]
            fn decode_fields(&mut self, dec: &mut ::ironbin::Decoder<'_>) -> ::ironbin::Result<()> {
                #(#decodes)*
                Ok(())
            }

            #[allow(unused_variables)]
            fn fields_encoded_len(&self, nested: ::ironbin::NestedVersioning) -> usize {
                0 #(#lens)*
            }

            #instantiate
        }

        impl ::ironbin::BinaryField for #ident {
            const FIELD_TYPE: ::ironbin::FieldType =
                ::ironbin::FieldType::Composite(<Self as ::ironbin::BinarySerialize>::SCHEMA);

            fn encode_field(&self, enc: &mut ::ironbin::Encoder<'_>) -> ::ironbin::Result<()> {
                enc.composite(self)
            }

            fn decode_field(dec: &mut ::ironbin::Decoder<'_>) -> ::ironbin::Result<Self> {
                dec.composite::<Self>()
            }

            fn decode_field_into(&mut self, dec: &mut ::ironbin::Decoder<'_>) -> ::ironbin::Result<()> {
                dec.composite_into(self)
            }

            fn encoded_len(&self, nested: ::ironbin::NestedVersioning) -> usize {
                nested.prefix_len()
                    + <Self as ::ironbin::BinarySerialize>::fields_encoded_len(self, nested)
            }
        }
    })
}

/// Declared type as written in the source, without token spacing.
fn type_name(ty: &Type) -> String {
    quote!(#ty).to_string().replace(' ', "")
}

fn expand_enum(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "BinaryEnum cannot be derived for generic types",
        ));
    }
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "BinaryEnum can only be derived for enums",
        ));
    };
    if let Some(variant) = data.variants.iter().find(|v| !v.fields.is_empty()) {
        return Err(syn::Error::new_spanned(
            variant,
            "BinaryEnum variants cannot carry fields",
        ));
    }

    let type_name = ident.to_string();
    let variants: Vec<_> = data.variants.iter().map(|v| &v.ident).collect();
    let variant_names = variants.iter().map(ToString::to_string);
    let ordinals = 0..variants.len();

    Ok(quote! {
        impl ::ironbin::BinaryEnum for #ident {
            const DESCRIPTOR: &'static ::ironbin::EnumDescriptor = &::ironbin::EnumDescriptor {
                name: #type_name,
                variants: &[#(#variant_names),*],
            };

            const VARIANTS: &'static [Self] = &[#(Self::#variants),*];

            fn ordinal(self) -> usize {
                match self {
                    #(Self::#variants => #ordinals,)*
                }
            }
        }
    })
}
