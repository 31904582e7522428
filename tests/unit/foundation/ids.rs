use super::*;

#[test]
fn signal_paths_outside_prefix_do_not_map() {
    let p = SignalPath::new("tb.status");
    assert_eq!(p.to_net_name("tb.uut."), None);
}

#[test]
fn escaped_identifiers_are_unescaped() {
    let p = SignalPath::new("tb.uut.\\core.alu_out ");
    assert_eq!(p.to_net_name("tb.uut."), Some(NetName::new("core.alu_out")));
}

#[test]
fn bare_prefix_is_not_a_net() {
    let p = SignalPath::new("tb.uut.");
    assert_eq!(p.to_net_name("tb.uut."), None);
}

#[test]
fn bit_aliases_only_index_wide_entries() {
    assert_eq!(NetName::for_bit("n", 0, 1).as_str(), "n");
    assert_eq!(NetName::for_bit("bus", 3, 8).as_str(), "bus[3]");
}

#[test]
fn ids_borrow_as_str_for_lookups() {
    let mut set = std::collections::HashSet::new();
    set.insert(InstanceName::new("_42_"));
    assert!(set.contains("_42_"));
}
