use kernel_domain::domain_event::DomainEvent;
use kernel_macros::domain_event;

#[domain_event(version = 2)]
enum InvoiceEvent {
    Issued { amount: u64 },
    #[event(event_type = "invoice.paid", event_version = 3)]
    Paid,
    Voided { id: String, reason: String },
}

#[domain_event(id = std::string::String)]
enum CounterEvent {
    Bumped,
}

fn main() {
    let issued = InvoiceEvent::Issued {
        id: "evt-1".into(),
        amount: 10,
    };
    assert_eq!(issued.event_id(), "evt-1");
    assert_eq!(issued.event_type(), "InvoiceEvent.Issued");
    assert_eq!(issued.event_version(), 2);

    let paid = InvoiceEvent::Paid { id: "evt-2".into() };
    assert_eq!(paid.event_type(), "invoice.paid");
    assert_eq!(paid.event_version(), 3);

    let voided = InvoiceEvent::Voided {
        id: "evt-3".into(),
        reason: "duplicate".into(),
    };
    assert_eq!(voided.clone(), voided);

    let json = serde_json::to_string(&CounterEvent::Bumped { id: "evt-9".into() }).unwrap();
    assert!(json.contains("Bumped"));
}
