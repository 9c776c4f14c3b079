use filtree::{BuilderMode, Field, SessionBuilder, TextOutcome};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let mut session = SessionBuilder::new()
        .fields(vec![
            Field::new("cos_provider", "Provider", "billing"),
            Field::new("service", "Service", "usage"),
        ])
        .build();

    session
        .set_mode(BuilderMode::Textual)
        .expect("entering textual mode never fails");

    for input in [
        r#"cos_provider in ["aws"] AND (service == "ec2" OR service == "s3")"#,
        "service ==",
        r#"NOT (service contains "lambda")"#,
    ] {
        match session.edit_text(input) {
            TextOutcome::Rejected(e) => println!("{input:?} rejected: {e}"),
            outcome => println!("{input:?} -> {outcome:?}, tree: {}", session.tree()),
        }
    }

    match session.set_mode(BuilderMode::Structured) {
        Ok(()) => println!("structured tree: {:#?}", session.tree()),
        Err(e) => println!("still textual: {e}"),
    }
}
