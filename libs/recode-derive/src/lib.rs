use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Visibility, parse_macro_input};

/// Derive macro implementing `recode::Reflect` for a struct.
///
/// Generates the aggregate descriptor: one field per struct field, in
/// declaration order, built once per type on first use. Only `pub` fields are visible to a recode;
/// every other field is carried along untouched.
///
/// # Example
///
/// ```ignore
/// #[derive(Reflect)]
/// pub struct Order {
///     pub id: u64,
///     pub price: f64,
///     pub tags: Vec<String>,
///     revision: u32,
/// }
/// ```
///
/// All field types must implement `Reflect` themselves. Generic structs,
/// tuple structs and enums are rejected.
#[proc_macro_derive(Reflect)]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens,
        Err(e) => e.to_compile_error().into(),
    }
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let name = &input.ident;
    let name_str = name.to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Reflect does not support generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Reflect only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Reflect only supports structs",
            ));
        }
    };

    let mut descriptor_tokens = Vec::new();
    let mut to_value_tokens = Vec::new();
    let mut from_value_tokens = Vec::new();
    let mut assign_tokens = Vec::new();

    for field in fields {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        let field_name_str = field_name.to_string();
        let field_name_str = field_name_str
            .strip_prefix("r#")
            .unwrap_or(&field_name_str)
            .to_string();
        let field_ty = &field.ty;
        let visible = matches!(field.vis, Visibility::Public(_));

        descriptor_tokens.push(quote! {
            ::recode::FieldDescriptor::new(
                #field_name_str,
                <#field_ty as ::recode::Reflect>::shape(),
                #visible,
            )
        });

        to_value_tokens.push(quote! {
            ::recode::Reflect::to_value(&self.#field_name)
        });

        from_value_tokens.push(quote! {
            #field_name: ::recode::reflect::read_field::<#field_ty>(__aggregate, #field_name_str)?
        });

        if visible {
            assign_tokens.push(quote! {
                ::recode::reflect::assign_field(&mut self.#field_name, __aggregate, #field_name_str)?;
            });
        }
    }

    let expanded = quote! {
        const _: () = {
            fn __descriptor() -> ::std::sync::Arc<::recode::AggregateDescriptor> {
                static __DESCRIPTOR: ::std::sync::OnceLock<
                    ::std::sync::Arc<::recode::AggregateDescriptor>,
                > = ::std::sync::OnceLock::new();
                ::std::sync::Arc::clone(__DESCRIPTOR.get_or_init(|| {
                    ::std::sync::Arc::new(::recode::AggregateDescriptor::new(
                        #name_str,
                        ::std::vec![#(#descriptor_tokens),*],
                    ))
                }))
            }

            impl ::recode::Reflect for #name {
                fn shape() -> ::recode::Shape {
                    ::recode::Shape::Aggregate(__descriptor())
                }

                fn to_value(&self) -> ::recode::Value {
                    ::recode::Value::Aggregate(::recode::AggregateValue::from_parts(
                        __descriptor(),
                        ::std::vec![#(#to_value_tokens),*],
                    ))
                }

                #[allow(unused_variables)]
                fn from_value(
                    __value: &::recode::Value,
                ) -> ::recode::Result<Self> {
                    let __aggregate = ::recode::reflect::expect_aggregate(__value)?;
                    ::std::result::Result::Ok(Self {
                        #(#from_value_tokens),*
                    })
                }

                #[allow(unused_variables)]
                fn assign(&mut self, __value: &::recode::Value) -> ::recode::Result<()> {
                    let __aggregate = ::recode::reflect::expect_aggregate(__value)?;
                    #(#assign_tokens)*
                    ::std::result::Result::Ok(())
                }
            }
        };
    };

    Ok(TokenStream::from(expanded))
}
