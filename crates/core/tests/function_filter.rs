use inspector_core::functions::{Capability, FunctionFilter};
use inspector_core::model::{FunctionOverview, FunctionSummary};

fn sample_functions() -> Vec<FunctionOverview> {
    vec![
        FunctionOverview::new(FunctionSummary {
            has_calls: true,
            has_writes: true,
            ..FunctionSummary::new("transfer(address,uint256)")
        })
        .with_entrypoint(3),
        FunctionOverview::new(FunctionSummary {
            has_reads: true,
            ..FunctionSummary::new("balanceOf(address)")
        }),
        FunctionOverview::new(FunctionSummary {
            has_creates: true,
            has_logs: true,
            ..FunctionSummary::new("Deploy()")
        }),
    ]
}

fn names<'a>(functions: &[&'a FunctionOverview]) -> Vec<&'a str> {
    functions.iter().map(|f| f.name()).collect()
}

#[test]
fn empty_filter_matches_everything() {
    let functions = sample_functions();
    assert_eq!(FunctionFilter::default().apply(&functions).len(), 3);
}

#[test]
fn name_filter_is_case_insensitive_substring() {
    let functions = sample_functions();
    let matched = FunctionFilter::new("ADDRESS").apply(&functions);
    assert_eq!(names(&matched), vec!["transfer(address,uint256)", "balanceOf(address)"]);

    let matched = FunctionFilter::new("deploy").apply(&functions);
    assert_eq!(names(&matched), vec!["Deploy()"]);
}

#[test]
fn every_selected_capability_is_required() {
    let functions = sample_functions();

    let filter = FunctionFilter::default().with_capability(Capability::Calls);
    assert_eq!(names(&filter.apply(&functions)), vec!["transfer(address,uint256)"]);

    let filter = filter.with_capability(Capability::Reads);
    assert!(filter.apply(&functions).is_empty());

    let filter = FunctionFilter::new("dep").with_capability(Capability::Creates);
    assert_eq!(names(&filter.apply(&functions)), vec!["Deploy()"]);
}

#[test]
fn capabilities_are_listed_in_fixed_order() {
    let functions = sample_functions();
    assert_eq!(
        functions[0].function.capabilities(),
        vec![Capability::Calls, Capability::Writes]
    );
    assert_eq!(
        functions[2].function.capabilities(),
        vec![Capability::Creates, Capability::Logs]
    );
}

#[test]
fn entrypoint_carries_function_name() {
    let functions = sample_functions();
    let entry = functions[0].entrypoint.as_ref().expect("entrypoint");
    assert_eq!(entry.function_name, "transfer(address,uint256)");
    assert_eq!(entry.block, 3);
}
