use inspector_core::graph::color::{
    function_color, golden_hue, pretty_function_name, FunctionDict, NO_FUNCTION_KEY,
    NO_FUNCTION_LABEL,
};
use inspector_core::model::{FunctionOverview, FunctionSummary};

fn overviews(names: &[&str]) -> Vec<FunctionOverview> {
    names.iter().map(|name| FunctionOverview::new(FunctionSummary::new(*name))).collect()
}

#[test]
fn colors_are_deterministic() {
    for index in 0..64 {
        assert_eq!(function_color(index), function_color(index));
    }
    assert_eq!(function_color(0), "#ff0000");
    assert_eq!(function_color(1), "#00ff9f");
}

#[test]
fn hues_stay_apart_for_reasonable_counts() {
    for n in 1..=50usize {
        let hues: Vec<f64> = (0..=n).map(golden_hue).collect();
        for (i, a) in hues.iter().enumerate() {
            for b in &hues[i + 1..] {
                assert!((a - b).abs() > 0.01, "hues {a} and {b} too close for n = {n}");
            }
        }
    }
}

#[test]
fn pretty_name_picks_shortest_alternative() {
    assert_eq!(pretty_function_name("foo() or bar(uint256)"), "foo()");
    assert_eq!(pretty_function_name("onlyOneName()"), "onlyOneName()");
    assert_eq!(pretty_function_name("approve(address,uint256) or x()"), "x()");
}

#[test]
fn no_function_bucket_uses_index_n() {
    let functions = overviews(&["a()", "b()", "c()"]);
    let dict = FunctionDict::from_functions(&functions);

    assert_eq!(dict.len(), 3);
    assert_eq!(dict.no_function().name, NO_FUNCTION_LABEL);
    assert_eq!(dict.no_function().color, function_color(3));
    for (index, (name, label)) in dict.iter().enumerate() {
        assert_eq!(name, functions[index].name());
        assert_eq!(label.color, function_color(index));
        assert_ne!(label.color, dict.no_function().color);
    }
}

#[test]
fn lookup_maps_missing_function_to_bucket() {
    let dict = FunctionDict::from_functions(&overviews(&["a()"]));
    assert_eq!(dict.lookup(None), Some(dict.no_function()));
    assert!(dict.lookup(Some("a()")).is_some());
    assert!(dict.lookup(Some("missing()")).is_none());
}

#[test]
fn a_function_named_zero_does_not_collide_with_bucket() {
    let dict = FunctionDict::from_functions(&overviews(&["0"]));
    let real = dict.get("0").expect("function named 0");
    assert_ne!(real, dict.no_function());

    let display = dict.to_display_map();
    assert_eq!(display.len(), 1);
    assert_eq!(display[NO_FUNCTION_KEY], *dict.no_function());

    let value = serde_json::to_value(&dict).expect("serialize dict");
    assert_eq!(value[NO_FUNCTION_KEY]["name"], NO_FUNCTION_LABEL);
    assert_eq!(value[NO_FUNCTION_KEY]["color"], dict.no_function().color.as_str());

    let legend = dict.legend();
    assert_eq!(legend.len(), 2);
    assert_eq!(legend[1].function.as_deref(), Some("0"));
}

#[test]
fn legend_lists_bucket_first_and_full_names_when_shortened() {
    let dict = FunctionDict::from_functions(&overviews(&["withdraw() or w()", "deposit()"]));
    let legend = dict.legend();

    assert_eq!(legend.len(), 3);
    assert_eq!(legend[0].function, None);
    assert_eq!(legend[0].short_name, NO_FUNCTION_LABEL);

    assert_eq!(legend[1].short_name, "w()");
    assert_eq!(legend[1].full_name.as_deref(), Some("withdraw() or w()"));

    assert_eq!(legend[2].short_name, "deposit()");
    assert_eq!(legend[2].full_name, None);
}

#[test]
fn display_map_is_keyed_with_zero_sentinel() {
    let dict = FunctionDict::from_functions(&overviews(&["f()"]));
    let value = serde_json::to_value(&dict).expect("serialize dict");

    assert_eq!(value[NO_FUNCTION_KEY]["name"], NO_FUNCTION_LABEL);
    assert_eq!(value["f()"]["name"], "f()");
    assert_eq!(value["f()"]["color"], "#ff0000");
}
