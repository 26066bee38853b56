use kernel_macros::value_object;

#[value_object]
struct Money {
    amount: i64,
    currency: String,
}

#[value_object(debug = false)]
struct Opaque(i32);

#[value_object(default)]
enum Tier {
    #[default]
    Standard,
    Premium,
}

fn main() {
    let a = Money {
        amount: 100,
        currency: "EUR".into(),
    };
    let b = a.clone();
    assert_eq!(a, b);
    assert_ne!(
        a,
        Money {
            amount: 100,
            currency: "USD".into(),
        }
    );
    let _ = format!("{:?}", a);

    assert!(Opaque(1) == Opaque(1));
    assert_eq!(Tier::default(), Tier::Standard);
    assert_ne!(Tier::Premium, Tier::Standard);
}
