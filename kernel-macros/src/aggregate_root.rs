use crate::entity::{entity_impl, expand_struct};
use crate::utils::MacroArgs;
use proc_macro::TokenStream;
use quote::quote;
use syn::parse::Parser;
use syn::{Field, Item, parse_macro_input};

/// #[aggregate_root] 宏实现
/// - 字段顺序：`id`, `version`, `domain_events`, [`audit`], 其余用户字段
/// - `domain_events` 标注 `#[serde(skip)]`，待发布事件从不进入存储
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = match (|input: syn::parse::ParseStream| {
        MacroArgs::parse_with(input, &["id", "event"])
    })
    .parse(attr)
    .and_then(|args| {
        args.ensure_known(&["id", "event", "type_name", "auditable", "debug"])
            .map(|_| args)
    }) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error().into(),
    };

    let mut st = match parse_macro_input!(item as Item) {
        Item::Struct(s) => s,
        other => {
            return syn::Error::new_spanned(other, "#[aggregate_root] only on struct")
                .to_compile_error()
                .into();
        }
    };

    let Some(event_type) = args.ty("event") else {
        return syn::Error::new(
            st.ident.span(),
            "#[aggregate_root] requires `event = EventType`",
        )
        .to_compile_error()
        .into();
    };

    let id_type = args.ty("id").unwrap_or_else(|| syn::parse_quote! { String });

    let (type_name, auditable, derive_debug) =
        match (args.str_lit("type_name"), args.flag("auditable"), args.flag("debug")) {
            (Ok(t), Ok(a), Ok(d)) => (t, a.unwrap_or(false), d.unwrap_or(true)),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
                return e.to_compile_error().into();
            }
        };

    let type_name = type_name
        .unwrap_or_else(|| syn::LitStr::new(&st.ident.to_string(), st.ident.span()));

    let mut extra: Vec<Field> = vec![syn::parse_quote! {
        #[serde(skip)]
        domain_events: ::kernel_domain::aggregate_root::DomainEvents<#event_type>
    }];
    if auditable {
        extra.push(syn::parse_quote! {
            audit: ::kernel_domain::aggregate_root::AuditInfo
        });
    }

    if let Err(err) = expand_struct(&mut st, &id_type, derive_debug, extra) {
        return err.to_compile_error().into();
    }

    let entity_impl = entity_impl(&st, &id_type);

    let ident = &st.ident;
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    let audit_methods = if auditable {
        quote! {
            fn audit(&self) -> ::core::option::Option<&::kernel_domain::aggregate_root::AuditInfo> {
                ::core::option::Option::Some(&self.audit)
            }

            fn audit_mut(&mut self) -> ::core::option::Option<&mut ::kernel_domain::aggregate_root::AuditInfo> {
                ::core::option::Option::Some(&mut self.audit)
            }
        }
    } else {
        quote! {}
    };

    TokenStream::from(quote! {
        #st

        #entity_impl

        impl #impl_generics ::kernel_domain::aggregate_root::AggregateRoot for #ident #ty_generics #where_clause {
            const TYPE: &'static str = #type_name;

            type Event = #event_type;

            fn domain_events(&self) -> &::kernel_domain::aggregate_root::DomainEvents<Self::Event> {
                &self.domain_events
            }

            fn domain_events_mut(&mut self) -> &mut ::kernel_domain::aggregate_root::DomainEvents<Self::Event> {
                &mut self.domain_events
            }

            fn set_version(&mut self, version: ::kernel_domain::value_object::Version) {
                self.version = version;
            }

            #audit_methods
        }
    })
}
