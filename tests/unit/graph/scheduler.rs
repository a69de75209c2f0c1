use std::{cell::Cell, rc::Rc};

use super::*;
use crate::{
    graph::{input::InputNode, processor::ProcessorNode},
    kernel::KernelType,
};

fn doubler(graph: &Graph, input: &str, calls: Rc<Cell<u32>>) -> ProcessorNode {
    ProcessorNode::new("Double", BuiltinType::Number, move |_, args| {
        calls.set(calls.get() + 1);
        Ok(Value::Number(args.number("x")? * 2.0))
    })
    .with_input("x", graph.dep(input).unwrap(), BuiltinType::Number)
}

#[test]
fn edges_are_type_checked_on_insertion() {
    let mut g = Graph::new();
    g.set("kernelType", InputNode::new(KernelType::Edl)).unwrap();

    let node = ProcessorNode::new("Double", BuiltinType::Number, |_, _| Ok(Value::Number(0.0)))
        .with_input("x", g.dep("kernelType").unwrap(), BuiltinType::Number);
    let err = g.set("double", node).unwrap_err();
    assert_eq!(
        err.to_string(),
        "graph type mismatch on `double.x`: expected Number, found KernelType"
    );
    assert!(g.get("double").is_none());
}

#[test]
fn unknown_nodes_and_outputs_are_rejected() {
    let mut g = Graph::new();
    let id = g.set("n", InputNode::new(1.0)).unwrap();
    assert!(matches!(g.dep("missing"), Err(EdlError::Graph(_))));
    assert!(matches!(g.dep_output("n", "depth"), Err(EdlError::Graph(_))));

    let dangling = ProcessorNode::new("P", BuiltinType::Number, |_, _| Ok(Value::Number(0.0)))
        .with_input("x", Dependency::new(NodeId(7)), BuiltinType::Number);
    assert!(matches!(g.set("p", dangling), Err(EdlError::Graph(_))));
    assert!(g.get_named_output(FrameIndex(0), id, "depth").is_err());
}

#[test]
fn eager_nodes_evaluate_once_per_frame() {
    let mut g = Graph::new();
    g.set("x", InputNode::new(3.0)).unwrap();
    let calls = Rc::new(Cell::new(0));
    let node = doubler(&g, "x", Rc::clone(&calls));
    let id = g.set("double", node).unwrap();

    assert_eq!(g.get_output(FrameIndex(0), id).unwrap(), Value::Number(6.0));
    assert_eq!(g.get_output(FrameIndex(0), id).unwrap(), Value::Number(6.0));
    assert_eq!(calls.get(), 1);

    g.get_output(FrameIndex(1), id).unwrap();
    assert_eq!(calls.get(), 2);

    let stats = g.stats(id).unwrap();
    assert_eq!(stats.evaluations, 2);
    assert_eq!(stats.last_frame, Some(FrameIndex(1)));
    assert!(stats.last_duration.is_some());
}

#[test]
fn lazy_static_nodes_skip_unchanged_arguments() {
    let mut g = Graph::new();
    g.set("x", InputNode::new(3.0)).unwrap();
    let calls = Rc::new(Cell::new(0));
    let node = doubler(&g, "x", Rc::clone(&calls)).with_policy(EvalPolicy::LazyStatic);
    let id = g.set("double", node).unwrap();

    for frame in 0..5 {
        assert_eq!(
            g.get_output(FrameIndex(frame), id).unwrap(),
            Value::Number(6.0)
        );
    }
    assert_eq!(calls.get(), 1);
    assert_eq!(g.stats(id).unwrap().cache_hits, 4);

    g.set_input("x", 4.0).unwrap();
    assert_eq!(g.get_output(FrameIndex(5), id).unwrap(), Value::Number(8.0));
    assert_eq!(calls.get(), 2);
}

#[test]
fn set_input_within_a_frame_invalidates_dependents() {
    let mut g = Graph::new();
    g.set("x", InputNode::new(1.0)).unwrap();
    let calls = Rc::new(Cell::new(0));
    let node = doubler(&g, "x", Rc::clone(&calls));
    let id = g.set("double", node).unwrap();

    assert_eq!(g.get_output(FrameIndex(0), id).unwrap(), Value::Number(2.0));
    g.set_input("x", 5.0).unwrap();
    assert_eq!(g.get_output(FrameIndex(0), id).unwrap(), Value::Number(10.0));
    assert_eq!(calls.get(), 2);
}

#[test]
fn set_input_keeps_the_declared_type() {
    let mut g = Graph::new();
    g.set("x", InputNode::new(1.0)).unwrap();
    let calls = Rc::new(Cell::new(0));
    let node = doubler(&g, "x", calls);
    g.set("double", node).unwrap();

    assert!(matches!(
        g.set_input("x", KernelType::Box),
        Err(EdlError::GraphTypeMismatch { .. })
    ));
    assert!(matches!(g.set_input("double", 1.0), Err(EdlError::Graph(_))));
    assert!(matches!(g.set_input("nope", 1.0), Err(EdlError::Graph(_))));
}

#[test]
fn replacement_keeps_id_and_rejects_cycles() {
    let mut g = Graph::new();
    let x = g.set("x", InputNode::new(1.0)).unwrap();
    let calls = Rc::new(Cell::new(0));
    let node = doubler(&g, "x", Rc::clone(&calls));
    let double = g.set("double", node).unwrap();

    // x <- double <- x would loop.
    let looped = doubler(&g, "double", Rc::clone(&calls));
    assert!(matches!(g.set("x", looped), Err(EdlError::Graph(_))));

    let self_loop = doubler(&g, "double", Rc::clone(&calls));
    assert!(matches!(g.set("double", self_loop), Err(EdlError::Graph(_))));

    assert_eq!(g.set("x", InputNode::new(7.0)).unwrap(), x);
    assert_eq!(
        g.get_output(FrameIndex(0), double).unwrap(),
        Value::Number(14.0)
    );
}

#[test]
fn replacement_must_keep_dependents_well_typed() {
    let mut g = Graph::new();
    g.set("x", InputNode::new(1.0)).unwrap();
    let node = doubler(&g, "x", Rc::new(Cell::new(0)));
    g.set("double", node).unwrap();

    assert!(matches!(
        g.set("x", InputNode::new(KernelType::Edl)),
        Err(EdlError::GraphTypeMismatch { .. })
    ));
}

#[test]
fn evaluation_errors_propagate_unchanged() {
    let mut g = Graph::new();
    let id = g
        .set(
            "fail",
            ProcessorNode::new("Fail", BuiltinType::Number, |_, _| {
                Err(EdlError::InvalidKernelSize(0.0))
            }),
        )
        .unwrap();
    assert!(matches!(
        g.get_output(FrameIndex(0), id),
        Err(EdlError::InvalidKernelSize(_))
    ));
    assert_eq!(g.stats(id).unwrap().evaluations, 0);
}

#[test]
fn declared_output_type_is_enforced() {
    let mut g = Graph::new();
    let id = g
        .set(
            "liar",
            ProcessorNode::new("Liar", BuiltinType::EdlKernel, |_, _| Ok(Value::Number(1.0))),
        )
        .unwrap();
    assert!(matches!(
        g.get_output(FrameIndex(0), id),
        Err(EdlError::Evaluation(_))
    ));
}

#[test]
fn dot_dump_lists_nodes_and_edges() {
    let mut g = Graph::new();
    g.set("x", InputNode::new(1.0)).unwrap();
    let node = doubler(&g, "x", Rc::new(Cell::new(0)));
    let id = g.set("double", node).unwrap();
    g.get_output(FrameIndex(0), id).unwrap();

    let dot = g.dump_dot();
    assert!(dot.starts_with("digraph G {"));
    assert!(dot.contains("n0 [label=\"x\\nInput\\nevals: 1"));
    assert!(dot.contains("n1 [label=\"double\\nDouble\\nevals: 1"));
    assert!(dot.contains("n0 -> n1 [label=\"x\"];"));
    assert!(dot.trim_end().ends_with('}'));
}
