use std::time::{Duration, Instant};

use filtree::controls::ColorScheme;
use filtree::{ChangeListener, Field, SessionBuilder, ValueOption};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let fields = vec![
        Field::new("cos_provider", "Provider", "billing")
            .with_default_operator("in")
            .with_values([
                ValueOption::new("aws", "AWS"),
                ValueOption::new("gcp", "Google Cloud"),
            ]),
        Field::new("service", "Service", "usage"),
    ];

    let mut session = SessionBuilder::new()
        .fields(fields)
        .default_field("cos_provider")
        .group_order(["billing", "usage"])
        .on_change(ChangeListener::new(|tree| match tree {
            Some(tree) => println!("changed: {tree}"),
            None => println!("changed: <unparseable text>"),
        }))
        .build();

    let root = session.tree().id();
    let provider = session.add_rule(root).expect("catalog has fields");
    session
        .select_values(provider, &["aws".to_owned(), "gcp".to_owned()])
        .expect("rule exists");

    // Free text is committed once typing pauses.
    let service = session.add_rule(root).expect("catalog has fields");
    session.set_field(service, "service").expect("known field");
    let t0 = Instant::now();
    for (i, text) in ["e", "ec", "ec2"].into_iter().enumerate() {
        session
            .type_value(service, text, t0 + Duration::from_millis(100 * i as u64))
            .expect("rule exists");
    }
    session.tick(t0 + Duration::from_secs(1));

    for id in [provider, service] {
        let view = session.rule_view(id, ColorScheme::Light).expect("rule exists");
        println!("{id}: {:?} (invalid: {})", view.value, view.invalid);
    }
    println!("valid: {}", session.is_valid());
}
