//! Unused declaration pruning

use openapi_typegen_common::DeclarationSet;
use std::collections::BTreeSet;
use tracing::debug;

/// Drop type declarations unreachable from `roots`
///
/// Reachability follows every name referenced from a reachable
/// declaration's body, transitively. Enums are always kept. Returns the
/// names removed, in their original order.
pub fn prune_unused(set: &mut DeclarationSet, roots: &BTreeSet<String>) -> Vec<String> {
    let mut reachable: BTreeSet<String> = BTreeSet::new();
    let mut worklist: Vec<String> = roots.iter().cloned().collect();

    while let Some(name) = worklist.pop() {
        if !reachable.insert(name.clone()) {
            continue;
        }
        if let Some(declaration) = set.get(&name) {
            worklist.extend(
                declaration
                    .references()
                    .into_iter()
                    .filter(|r| !reachable.contains(r)),
            );
        }
    }

    let mut pruned = Vec::new();
    set.declarations.retain(|declaration| {
        if reachable.contains(declaration.name()) {
            true
        } else {
            debug!(declaration = declaration.name(), "pruned unused declaration");
            pruned.push(declaration.name().to_string());
            false
        }
    });
    pruned
}
