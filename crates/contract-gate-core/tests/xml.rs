// crates/contract-gate-core/tests/xml.rs
// ============================================================================
// Module: XML Pattern Tests
// Description: Element identity, attributes, child occurrences, and wrapping.
// Purpose: Ensure XML bodies match and generate like JSON bodies.
// ============================================================================

//! ## Overview
//! Builds a small order document pattern and checks generation, positional
//! child matching, optional attributes, and unwrapped array holders.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Arc;

use contract_gate_core::Occurs;
use contract_gate_core::Pattern;
use contract_gate_core::PatternRegistry;
use contract_gate_core::Resolver;
use contract_gate_core::Value;
use contract_gate_core::XmlElementPattern;
use contract_gate_core::XmlNode;
use contract_gate_core::generate;
use contract_gate_core::match_value;

fn registry() -> PatternRegistry {
    let item = XmlElementPattern::new("item")
        .with_attribute("sku", Pattern::string(), false)
        .with_child(Pattern::integer(), Occurs::One);
    let items = XmlElementPattern::new("items").with_child(Pattern::reference("Item"), Occurs::Multiple).unwrapped();
    let order = XmlElementPattern::new("order")
        .with_namespace("urn:orders", Some("o"))
        .with_attribute("id", Pattern::integer(), false)
        .with_attribute("note", Pattern::string(), true)
        .with_child(Pattern::reference("Items"), Occurs::One)
        .with_child(XmlElementPattern::new("total").with_child(Pattern::number(), Occurs::One).into(), Occurs::Optional);
    PatternRegistry::new()
        .with("Item", item.into())
        .unwrap()
        .with("Items", items.into())
        .unwrap()
        .with("Order", order.into())
        .unwrap()
}

fn resolver() -> Resolver {
    let registry = registry();
    registry.validate().unwrap();
    Resolver::with_defaults(Arc::new(registry))
}

fn order_node(children: Vec<Value>) -> Value {
    let mut node = XmlNode::new("order").with_attribute("id", "7");
    node.namespace = Some("urn:orders".to_string());
    node.prefix = Some("o".to_string());
    node.children = children;
    Value::Xml(node)
}

fn item(sku: &str, quantity: &str) -> Value {
    Value::Xml(XmlNode::new("item").with_attribute("sku", sku).with_child(Value::string(quantity)))
}

#[test]
fn generated_document_matches_and_splices_unwrapped_items() {
    let mut resolver = resolver();
    let pattern = Pattern::reference("Order");
    let value = generate(&pattern, &mut resolver).unwrap();
    let result = match_value(&value, &pattern, &mut resolver);
    assert!(result.is_success(), "{}", result.report_string());

    let Value::Xml(node) = &value else { panic!("expected xml") };
    assert!(node.children.iter().all(|child| !matches!(child, Value::Xml(c) if c.name == "items")));
    assert!(node.render().starts_with("<o:order xmlns:o=\"urn:orders\""));
}

#[test]
fn repeated_children_are_matched_in_sequence() {
    let mut resolver = resolver();
    let value = order_node(vec![item("A1", "2"), item("B2", "5"), Value::string("  ")]);
    assert!(match_value(&value, &Pattern::reference("Order"), &mut resolver).is_success());
}

#[test]
fn bad_child_text_reports_indexed_path() {
    let mut resolver = resolver();
    let value = order_node(vec![item("A1", "2"), item("B2", "five")]);
    let result = match_value(&value, &Pattern::reference("Order"), &mut resolver);
    let paths = result.as_failure().map(|failure| failure.leaf_paths()).unwrap_or_default();
    assert_eq!(paths, vec!["item[1].text".to_string()]);
}

#[test]
fn wrapper_element_is_rejected_when_unwrapped() {
    let mut resolver = resolver();
    let wrapped = Value::Xml(XmlNode::new("items").with_child(item("A1", "2")));
    let result = match_value(&order_node(vec![wrapped]), &Pattern::reference("Order"), &mut resolver);
    assert!(result.report_string().contains("Child <items> was unexpected"));
}

#[test]
fn missing_required_attribute_and_wrong_namespace_fail() {
    let mut resolver = resolver();
    let Value::Xml(mut node) = order_node(vec![item("A1", "2")]) else { panic!("expected xml") };
    node.attributes.shift_remove("id");
    let result = match_value(&Value::Xml(node.clone()), &Pattern::reference("Order"), &mut resolver);
    assert!(result.report_string().contains("Expected attribute named \"id\" was missing"));

    node.namespace = Some("urn:other".to_string());
    let result = match_value(&Value::Xml(node), &Pattern::reference("Order"), &mut resolver);
    assert!(result.report_string().contains("Expected namespace urn:orders"));
}

#[test]
fn optional_and_repeated_children_leave_nodes_for_required_siblings() {
    let mut resolver = resolver();
    let a = || Value::Xml(XmlNode::new("a"));
    let root = |count: usize| {
        let mut node = XmlNode::new("root");
        node.children = (0..count).map(|_| a()).collect();
        Value::Xml(node)
    };
    let optional_first: Pattern = XmlElementPattern::new("root")
        .with_child(XmlElementPattern::new("a").into(), Occurs::Optional)
        .with_child(XmlElementPattern::new("a").into(), Occurs::One)
        .into();
    assert!(match_value(&root(1), &optional_first, &mut resolver).is_success());
    assert!(match_value(&root(2), &optional_first, &mut resolver).is_success());
    let crowded = match_value(&root(3), &optional_first, &mut resolver);
    assert!(crowded.report_string().contains("Child <a> was unexpected"));

    let repeated_first: Pattern = XmlElementPattern::new("root")
        .with_child(XmlElementPattern::new("a").into(), Occurs::Multiple)
        .with_child(XmlElementPattern::new("a").into(), Occurs::One)
        .into();
    assert!(match_value(&root(1), &repeated_first, &mut resolver).is_success());
    assert!(match_value(&root(4), &repeated_first, &mut resolver).is_success());
    assert!(!match_value(&root(0), &repeated_first, &mut resolver).is_success());
}
