//! Quick start example for qfilter.
//!
//! Builds a filter for a product search, shows what it renders to, which
//! payload indexes it would use, and what the optimizer makes of it.

use qfilter::prelude::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("🌟 qfilter Quick Start Example\n");

    // In stock, in one of two categories, not discontinued, near Berlin
    let filter = Filter::from_condition(field("in_stock").eq(true))
        .add_condition(GroupCondition::should(vec![
            Box::new(field("category").eq("laptops")),
            Box::new(field("category").eq("tablets")),
        ]))?
        .add_condition(GroupCondition::must_not(vec![Box::new(
            field("status").eq("discontinued"),
        )]))?
        .add_condition(field("warehouse").within_radius(GeoPoint::new(13.40, 52.52), 50_000.0))?
        .add_condition(field("price").gte(100).lt(1500.0))?;

    println!("📄 Rendered filter:\n{}\n", filter);

    println!("🗂  Payload indexes this filter would use:");
    let mut fields: Vec<_> = filter.collect_payload_fields().into_iter().collect();
    fields.sort();
    for f in &fields {
        match f.field_type {
            Some(field_type) => println!("   {:<12} {}", f.name, field_type),
            None => println!("   {:<12} (no index)", f.name),
        }
    }
    println!();

    // Nested single-child groups collapse into their parent
    let mut nested = Filter::from_condition(GroupCondition::must(vec![Box::new(
        GroupCondition::must(vec![Box::new(GroupCondition::should(vec![
            Box::new(field("lang").eq("en")),
            Box::new(field("lang").eq("de")),
        ]))]),
    )]));
    println!("🔧 Before optimization: {}", nested.render(false));
    let rewrites = nested.optimize();
    println!("✅ After {} rewrites:    {}", rewrites, nested.render(false));

    // Hand-written filters pass through untouched
    let raw = Filter::from_raw(r#"{"must":[{"has_id":[1,2,3]}]}"#)?;
    println!("\n📦 Raw filter: {}", raw);
    if let Err(e) = raw.add_condition(field("lang").eq("en")) {
        println!("⛔ {}", e);
    }

    // Request bodies embed the filter as a JSON value
    let body = serde_json::json!({ "limit": 10, "filter": filter.to_value()? });
    println!("\n📨 Request body: {}", body);

    Ok(())
}
