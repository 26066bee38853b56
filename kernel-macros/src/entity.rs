use crate::utils::{MacroArgs, apply_derives, named_fields_of, prepend_fields};
use proc_macro::TokenStream;
use quote::quote;
use syn::parse::Parser;
use syn::{Field, Item, ItemStruct, Type, parse_macro_input};

/// #[entity] 宏实现
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = match (|input: syn::parse::ParseStream| MacroArgs::parse_with(input, &["id"]))
        .parse(attr)
        .and_then(|args| args.ensure_known(&["id", "debug"]).map(|_| args))
    {
        Ok(args) => args,
        Err(err) => return err.to_compile_error().into(),
    };

    let mut st = match parse_macro_input!(item as Item) {
        Item::Struct(s) => s,
        other => {
            return syn::Error::new_spanned(other, "#[entity] only on struct")
                .to_compile_error()
                .into();
        }
    };

    let id_type = args.ty("id").unwrap_or_else(|| syn::parse_quote! { String });
    let derive_debug = match args.flag("debug") {
        Ok(v) => v.unwrap_or(true),
        Err(err) => return err.to_compile_error().into(),
    };

    match expand_struct(&mut st, &id_type, derive_debug, Vec::new()) {
        Ok(()) => {}
        Err(err) => return err.to_compile_error().into(),
    }

    let entity_impl = entity_impl(&st, &id_type);

    TokenStream::from(quote! {
        #st
        #entity_impl
    })
}

/// 注入 `id`/`version`（以及调用方追加的字段）并合并派生
pub(crate) fn expand_struct(
    st: &mut ItemStruct,
    id_type: &Type,
    derive_debug: bool,
    extra_fields: Vec<Field>,
) -> syn::Result<()> {
    let fields = named_fields_of(st, "entity")?;

    let mut required: Vec<Field> = vec![
        syn::parse_quote! { id: #id_type },
        syn::parse_quote! { version: ::kernel_domain::value_object::Version },
    ];
    required.extend(extra_fields);
    prepend_fields(fields, required);

    let mut derives: Vec<syn::Path> = vec![
        syn::parse_quote!(Clone),
        syn::parse_quote!(Default),
        syn::parse_quote!(serde::Serialize),
        syn::parse_quote!(serde::Deserialize),
    ];
    if derive_debug {
        derives.insert(0, syn::parse_quote!(Debug));
    }
    apply_derives(&mut st.attrs, derives);

    Ok(())
}

pub(crate) fn entity_impl(st: &ItemStruct, id_type: &Type) -> proc_macro2::TokenStream {
    let ident = &st.ident;
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    quote! {
        impl #impl_generics ::kernel_domain::entity::Entity for #ident #ty_generics #where_clause {
            type Id = #id_type;

            fn new(id: Self::Id, version: ::kernel_domain::value_object::Version) -> Self {
                Self { id, version, ..::core::default::Default::default() }
            }

            fn id(&self) -> &Self::Id { &self.id }

            fn version(&self) -> ::kernel_domain::value_object::Version { self.version }
        }
    }
}
