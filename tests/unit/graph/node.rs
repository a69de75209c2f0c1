use super::*;

#[test]
fn dependency_defaults_to_value_output() {
    let dep = Dependency::new(NodeId(3));
    assert_eq!(dep.output, DEFAULT_IO_NAME);
    assert_eq!(Dependency::named(NodeId(3), "depth").output, "depth");
    assert_eq!(NodeId(3).to_string(), "n3");
}

#[test]
fn typed_getters_check_the_variant() {
    let mut args = NodeArgs::new();
    args.insert("kernelSize", Value::Number(16.0));
    args.insert("kernelType", Value::KernelType(KernelType::Edl));

    assert_eq!(args.number("kernelSize").unwrap(), 16.0);
    assert_eq!(args.kernel_type("kernelType").unwrap(), KernelType::Edl);

    let err = args.number("kernelType").unwrap_err();
    assert_eq!(
        err.to_string(),
        "evaluation error: argument `kernelType` expects Number, got KernelType"
    );
    assert!(args.camera("camera").is_err());
    assert_eq!(args.len(), 2);
}

#[test]
fn single_output_uses_default_name() {
    let outputs = NodeOutputs::single(Value::Number(1.0));
    assert_eq!(outputs.get(DEFAULT_IO_NAME), Some(&Value::Number(1.0)));
    assert!(outputs.get("other").is_none());
}
