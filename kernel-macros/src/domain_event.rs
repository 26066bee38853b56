use crate::utils::{MacroArgs, apply_derives, has_field};
use proc_macro::TokenStream;
use quote::quote;
use std::collections::HashMap;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Field, Item, Token, parse_macro_input};

/// #[domain_event] 宏实现
/// - 具名字段变体：若缺失则在最前追加 `id: IdType`
/// - 单元变体：改写为 `Variant { id: IdType }`
/// - 元组变体不支持（事件字段需具名以便上抬与投影）
/// - 生成 `::kernel_domain::domain_event::DomainEvent` 实现（event_id/event_type/event_version）
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = match (|input: syn::parse::ParseStream| MacroArgs::parse_with(input, &["id"]))
        .parse(attr)
        .and_then(|args| args.ensure_known(&["id", "version"]).map(|_| args))
    {
        Ok(args) => args,
        Err(err) => return err.to_compile_error().into(),
    };

    let mut enum_item = match parse_macro_input!(item as Item) {
        Item::Enum(e) => e,
        other => {
            return syn::Error::new_spanned(other, "#[domain_event] can only be used on enum types")
                .to_compile_error()
                .into();
        }
    };

    let id_type = args.ty("id").unwrap_or_else(|| syn::parse_quote! { String });
    let default_version = match args.int_lit("version") {
        Ok(v) => v.unwrap_or_else(|| syn::parse_quote! { 1 }),
        Err(err) => return err.to_compile_error().into(),
    };

    apply_derives(
        &mut enum_item.attrs,
        vec![
            syn::parse_quote!(Debug),
            syn::parse_quote!(Clone),
            syn::parse_quote!(PartialEq),
            syn::parse_quote!(serde::Serialize),
            syn::parse_quote!(serde::Deserialize),
        ],
    );

    // 变体 -> 自定义事件类型名 / 版本
    let mut variant_types: HashMap<String, syn::LitStr> = HashMap::new();
    let mut variant_versions: HashMap<String, syn::LitInt> = HashMap::new();

    for v in &mut enum_item.variants {
        let id_field: Field = syn::parse_quote! { id: #id_type };

        if matches!(v.fields, syn::Fields::Unit) {
            v.fields = syn::Fields::Named(syn::parse_quote!({ #id_field }));
        }

        match &mut v.fields {
            syn::Fields::Named(fields) => {
                if !has_field(fields, "id") {
                    let mut named: Punctuated<Field, Token![,]> = Punctuated::new();
                    named.push(id_field);
                    named.extend(std::mem::take(&mut fields.named));
                    fields.named = named;
                }
            }
            _ => {
                return syn::Error::new_spanned(
                    &v.ident,
                    "#[domain_event] supports named-field or unit variants, e.g., Variant { x: T }",
                )
                .to_compile_error()
                .into();
            }
        }

        let mut retained = Vec::new();
        for attr in std::mem::take(&mut v.attrs) {
            if !attr.path().is_ident("event") {
                retained.push(attr);
                continue;
            }

            let parsed = attr
                .parse_args_with(|input: syn::parse::ParseStream| {
                    MacroArgs::parse_with(input, &[])
                })
                .and_then(|a| a.ensure_known(&["event_type", "event_version"]).map(|_| a))
                .and_then(|a| Ok((a.str_lit("event_type")?, a.int_lit("event_version")?)));

            match parsed {
                Ok((ty, ver)) => {
                    let key = v.ident.to_string();
                    let mut duplicated = None;
                    if let Some(lit) = ty {
                        if variant_types.insert(key.clone(), lit).is_some() {
                            duplicated = Some("event_type");
                        }
                    }
                    if let Some(lit) = ver {
                        if variant_versions.insert(key, lit).is_some() {
                            duplicated = Some("event_version");
                        }
                    }
                    if let Some(name) = duplicated {
                        return syn::Error::new_spanned(
                            &attr,
                            format!("duplicate '{name}' specified for this variant"),
                        )
                        .to_compile_error()
                        .into();
                    }
                }
                Err(err) => return err.to_compile_error().into(),
            }
        }
        v.attrs = retained;
    }

    let enum_ident = &enum_item.ident;
    let enum_name = enum_ident.to_string();

    let id_arms = enum_item.variants.iter().map(|v| {
        let v_ident = &v.ident;
        quote! { Self::#v_ident { id, .. } => ::core::convert::AsRef::<str>::as_ref(id) }
    });

    let type_arms = enum_item.variants.iter().map(|v| {
        let v_ident = &v.ident;
        let lit = variant_types.get(&v_ident.to_string()).cloned().unwrap_or_else(|| {
            syn::LitStr::new(&format!("{enum_name}.{v_ident}"), v_ident.span())
        });
        quote! { Self::#v_ident { .. } => #lit }
    });

    let version_arms = enum_item.variants.iter().map(|v| {
        let v_ident = &v.ident;
        let lit = variant_versions
            .get(&v_ident.to_string())
            .cloned()
            .unwrap_or_else(|| default_version.clone());
        quote! { Self::#v_ident { .. } => #lit }
    });

    let (impl_generics, ty_generics, where_clause) = enum_item.generics.split_for_impl();

    TokenStream::from(quote! {
        #enum_item

        impl #impl_generics ::kernel_domain::domain_event::DomainEvent for #enum_ident #ty_generics #where_clause {
            fn event_id(&self) -> &str {
                match self { #( #id_arms, )* }
            }

            fn event_type(&self) -> &str {
                match self { #( #type_arms, )* }
            }

            fn event_version(&self) -> usize {
                match self { #( #version_arms, )* }
            }
        }
    })
}
