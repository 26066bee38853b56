use kernel_domain::entity::Entity;
use kernel_domain::value_object::Version;
use kernel_macros::entity;

#[entity(id = u64)]
struct LineItem {
    sku: String,
    quantity: u32,
}

#[entity(debug = false)]
struct Secret {
    token: String,
}

fn main() {
    let mut item = LineItem::new(7, Version::new());
    item.sku = "sku-1".into();
    item.quantity = 2;
    assert_eq!(*item.id(), 7);
    assert!(item.version().is_new());
    let _ = format!("{:?}", item);

    let secret = Secret::new("s-1".to_string(), Version::from_value(3));
    assert_eq!(secret.version().value(), 3);
    assert!(secret.token.is_empty());
}
