use quote::ToTokens;
use syn::parse::ParseStream;
use syn::punctuated::Punctuated;
use syn::{Attribute, Field, FieldsNamed, Ident, Result, Token, Type};

/// 宏参数值：开关、类型或字面量
pub(crate) enum ArgValue {
    Flag,
    Type(Box<Type>),
    Lit(syn::Lit),
}

/// 统一解析 `key = value, flag, ...` 形式的宏参数
///
/// `type_keys` 中列出的键按类型解析（如 `id = Uuid`），其余按字面量解析。
pub(crate) struct MacroArgs {
    entries: Vec<(Ident, ArgValue)>,
}

impl MacroArgs {
    pub(crate) fn parse_with(input: ParseStream, type_keys: &[&str]) -> Result<Self> {
        let mut entries: Vec<(Ident, ArgValue)> = Vec::new();

        while !input.is_empty() {
            let key: Ident = input.parse()?;

            if entries.iter().any(|(k, _)| k == &key) {
                return Err(syn::Error::new(
                    key.span(),
                    format!("duplicate key '{key}' in attribute"),
                ));
            }

            let value = if input.peek(Token![=]) {
                let _eq: Token![=] = input.parse()?;
                if type_keys.iter().any(|k| key == k) {
                    ArgValue::Type(Box::new(input.parse()?))
                } else {
                    ArgValue::Lit(input.parse()?)
                }
            } else {
                ArgValue::Flag
            };

            entries.push((key, value));

            if input.is_empty() {
                break;
            }
            let _comma: Token![,] = input.parse()?;
        }

        Ok(Self { entries })
    }

    /// 拒绝未声明的键
    pub(crate) fn ensure_known(&self, allowed: &[&str]) -> Result<()> {
        for (key, _) in &self.entries {
            if !allowed.iter().any(|k| key == k) {
                let expected = allowed
                    .iter()
                    .map(|k| format!("'{k}'"))
                    .collect::<Vec<_>>()
                    .join(" | ");
                return Err(syn::Error::new(
                    key.span(),
                    format!("unknown key '{key}'; expected {expected}"),
                ));
            }
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Option<&(Ident, ArgValue)> {
        self.entries.iter().find(|(k, _)| k == key)
    }

    pub(crate) fn ty(&self, key: &str) -> Option<Type> {
        match self.get(key) {
            Some((_, ArgValue::Type(ty))) => Some((**ty).clone()),
            _ => None,
        }
    }

    /// `key` 或 `key = true|false`
    pub(crate) fn flag(&self, key: &str) -> Result<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some((_, ArgValue::Flag)) => Ok(Some(true)),
            Some((_, ArgValue::Lit(syn::Lit::Bool(b)))) => Ok(Some(b.value())),
            Some((k, _)) => Err(syn::Error::new(
                k.span(),
                format!("expected boolean literal for '{k}'"),
            )),
        }
    }

    pub(crate) fn str_lit(&self, key: &str) -> Result<Option<syn::LitStr>> {
        match self.get(key) {
            None => Ok(None),
            Some((_, ArgValue::Lit(syn::Lit::Str(s)))) => Ok(Some(s.clone())),
            Some((k, _)) => Err(syn::Error::new(
                k.span(),
                format!("expected string literal for '{k}'"),
            )),
        }
    }

    pub(crate) fn int_lit(&self, key: &str) -> Result<Option<syn::LitInt>> {
        match self.get(key) {
            None => Ok(None),
            Some((_, ArgValue::Lit(syn::Lit::Int(i)))) => Ok(Some(i.clone())),
            Some((k, _)) => Err(syn::Error::new(
                k.span(),
                format!("expected integer literal for '{k}'"),
            )),
        }
    }
}

// 提取非 derive 属性与已有 derive 列表
fn split_derives(attrs: &[Attribute]) -> (Vec<Attribute>, Vec<syn::Path>) {
    let mut retained = Vec::new();
    let mut existing = Vec::new();
    for attr in attrs.iter() {
        if attr.path().is_ident("derive") {
            if let Ok(list) =
                attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
            {
                existing.extend(list);
            }
        } else {
            retained.push(attr.clone());
        }
    }
    (retained, existing)
}

// 归一化 derive 的 key，避免 Serialize/serde::Serialize 重复
fn derive_key(p: &syn::Path) -> String {
    match p.segments.last() {
        Some(last) => {
            let ident = last.ident.to_string();
            match ident.as_str() {
                "Serialize" | "Deserialize" => format!("serde::{ident}"),
                _ => ident,
            }
        }
        None => p.to_token_stream().to_string(),
    }
}

/// 合并默认派生与用户已有派生（去重，required 优先），结果置于属性列表最前
pub(crate) fn apply_derives(attrs: &mut Vec<Attribute>, required: Vec<syn::Path>) {
    let (retained, existing) = split_derives(attrs);

    let mut seen = std::collections::HashSet::<String>::new();
    let merged: Vec<syn::Path> = required
        .into_iter()
        .chain(existing)
        .filter(|p| seen.insert(derive_key(p)))
        .collect();

    let derive: Attribute = syn::parse_quote!(#[derive(#(#merged),*)]);
    *attrs = std::iter::once(derive).chain(retained).collect();
}

pub(crate) fn has_field(fields: &FieldsNamed, name: &str) -> bool {
    fields
        .named
        .iter()
        .any(|f| f.ident.as_ref().is_some_and(|i| i == name))
}

/// 将所需字段按给定顺序放在最前：已存在则复用原定义，否则以给定类型新建
pub(crate) fn prepend_fields(fields: &mut FieldsNamed, required: Vec<Field>) {
    let old = std::mem::take(&mut fields.named);
    let mut named: Punctuated<Field, Token![,]> = Punctuated::new();

    let names: Vec<String> = required
        .iter()
        .filter_map(|f| f.ident.as_ref().map(|i| i.to_string()))
        .collect();

    for field in required {
        let existing = old
            .iter()
            .find(|f| f.ident.is_some() && f.ident == field.ident)
            .cloned();
        named.push(existing.unwrap_or(field));
    }

    for f in old {
        let is_required = f
            .ident
            .as_ref()
            .is_some_and(|i| names.iter().any(|n| i == n));
        if !is_required {
            named.push(f);
        }
    }

    fields.named = named;
}

pub(crate) fn named_fields_of<'a>(
    st: &'a mut syn::ItemStruct,
    macro_name: &str,
) -> Result<&'a mut FieldsNamed> {
    // 单元结构体视为无字段的具名结构体
    if matches!(st.fields, syn::Fields::Unit) {
        st.fields = syn::Fields::Named(syn::parse_quote!({}));
    }

    let span = st.ident.span();
    match &mut st.fields {
        syn::Fields::Named(f) => Ok(f),
        _ => Err(syn::Error::new(
            span,
            format!("#[{macro_name}] only supports named-field struct"),
        )),
    }
}
