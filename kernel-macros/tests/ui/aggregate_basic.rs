use kernel_domain::aggregate_root::AggregateRoot;
use kernel_domain::entity::Entity;
use kernel_domain::value_object::Version;
use kernel_macros::{aggregate_root, domain_event, entity_id};

#[entity_id]
struct AccountId(String);

#[domain_event]
enum AccountEvent {
    Opened { owner: String },
    Closed,
}

#[aggregate_root(event = AccountEvent, id = AccountId, type_name = "account", auditable)]
struct Account {
    owner: String,
}

#[aggregate_root(event = AccountEvent)]
struct Ledger {}

fn main() {
    let mut account = Account::new(AccountId::new("a-1".into()), Version::new());
    account.owner = "alice".into();
    account.add_domain_event(AccountEvent::Opened {
        id: "evt-1".into(),
        owner: "alice".into(),
    });
    account.add_domain_event(AccountEvent::Closed { id: "evt-2".into() });

    assert_eq!(Account::TYPE, "account");
    assert_eq!(Ledger::TYPE, "Ledger");
    assert!(account.audit().is_some());
    assert_eq!(account.take_domain_events().len(), 2);
    assert!(!account.has_pending_events());

    let ledger = Ledger::new("l-1".to_string(), Version::new());
    assert!(ledger.audit().is_none());
}
