// Unit tests for probe detection shared by the session loop and the log writer

use common::wire::{PROBE, is_probe};

/// **VALUE**: Verifies what counts as probe traffic.
///
/// **WHY THIS MATTERS**: Probe traffic is silently dropped by the server. Classifying a
/// real message as a probe loses it; classifying a probe as a message produces a stray
/// ack and a junk log row.
///
/// **BUG THIS CATCHES**: Would catch:
/// - An empty payload being treated as a probe
/// - A message of several spaces being dropped (the sender would wait forever for its ack)
/// - A message with surrounding spaces being dropped
#[test]
fn given_payloads_when_classified_then_only_single_space_is_probe() {
    // GIVEN / WHEN / THEN
    assert!(is_probe(PROBE));
    assert!(!is_probe("  "));
    assert!(!is_probe("   "));
    assert!(!is_probe(""));
    assert!(!is_probe(" hello "));
    assert!(!is_probe("\n"));
}
