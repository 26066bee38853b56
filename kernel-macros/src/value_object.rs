use crate::utils::{MacroArgs, apply_derives};
use proc_macro::TokenStream;
use quote::quote;
use syn::parse::Parser;
use syn::{Item, parse_macro_input};

/// #[value_object] 宏实现
/// - 支持结构体（具名或 tuple）与枚举
/// - 合并/追加派生：Clone, (Debug 可控), Serialize, Deserialize, PartialEq, Eq
/// - `default`：额外派生 Default（枚举需自行标注 `#[default]` 变体）
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = match (|input: syn::parse::ParseStream| MacroArgs::parse_with(input, &[]))
        .parse(attr)
        .and_then(|args| args.ensure_known(&["debug", "default"]).map(|_| args))
    {
        Ok(args) => args,
        Err(err) => return err.to_compile_error().into(),
    };

    let (derive_debug, derive_default) = match (args.flag("debug"), args.flag("default")) {
        (Ok(d), Ok(def)) => (d.unwrap_or(true), def.unwrap_or(false)),
        (Err(e), _) | (_, Err(e)) => return e.to_compile_error().into(),
    };

    let mut derives: Vec<syn::Path> = vec![
        syn::parse_quote!(Clone),
        syn::parse_quote!(serde::Serialize),
        syn::parse_quote!(serde::Deserialize),
        syn::parse_quote!(PartialEq),
        syn::parse_quote!(Eq),
    ];
    if derive_debug {
        derives.insert(0, syn::parse_quote!(Debug));
    }
    if derive_default {
        derives.push(syn::parse_quote!(Default));
    }

    let mut input = parse_macro_input!(item as Item);

    match &mut input {
        Item::Struct(st) => {
            apply_derives(&mut st.attrs, derives);
            TokenStream::from(quote! { #st })
        }
        Item::Enum(en) => {
            apply_derives(&mut en.attrs, derives);
            TokenStream::from(quote! { #en })
        }
        other => syn::Error::new_spanned(other, "#[value_object] only supports struct or enum")
            .to_compile_error()
            .into(),
    }
}
