use kernel_macros::entity_id;
use uuid::Uuid;

#[entity_id]
struct UserId(Uuid);

#[entity_id(debug = false)]
struct ProfileId(String);

impl std::fmt::Debug for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProfileId(..)")
    }
}

fn main() {
    let raw = Uuid::new_v4();
    let id = UserId::new(raw);
    assert_eq!(*id.value(), raw);
    assert_eq!(id.to_string(), raw.to_string());
    let parsed: UserId = raw.to_string().parse().unwrap();
    assert_eq!(parsed, id);
    let back: Uuid = id.into();
    assert_eq!(back, raw);

    let pid = ProfileId::from("p-1".to_string());
    assert_eq!(format!("{:?}", pid), "ProfileId(..)");
    assert_eq!(pid.as_ref(), "p-1");
}
