// Export of the pairwise comparison matrices of the experts.

use crate::conrank::*;

/// The matrices of one expert: the pairs of the saved ranking and the signed
/// comparison matrix over all the items.
fn expert_matrix_to_json(universe: &Universe, record: &ExpertRecord) -> JSValue {
    let order: Vec<u64> = record.order.iter().map(|pos| universe.item(*pos).id).collect();
    let pairs: Vec<JSValue> = record
        .representation
        .precedence
        .pairs()
        .iter()
        .map(|(a, b)| json!([universe.item(*a).id, universe.item(*b).id, 1]))
        .collect();
    json!({
        "expert_id": record.expert_id,
        "expert_name": record.name,
        "n": order.len(),
        "order": order,
        "pairs": pairs,
        "matrix": comparison_matrix(&record.representation.rank_map),
    })
}

pub fn matrices_to_json(universe: &Universe, records: &[ExpertRecord]) -> JSValue {
    let items: Vec<JSValue> = universe.items().iter().map(item_to_json).collect();
    let experts: Vec<JSValue> = records
        .iter()
        .map(|r| expert_matrix_to_json(universe, r))
        .collect();
    json!({ "items": items, "experts": experts })
}

pub fn write_matrices(path: &str, universe: &Universe, records: &[ExpertRecord]) -> ConResult<()> {
    let js = matrices_to_json(universe, records);
    let pretty = serde_json::to_string_pretty(&js).context(ParsingJsonSnafu {})?;
    info!("Writing the matrices of {} experts to {:?}", records.len(), path);
    fs::write(path, pretty).context(WritingOutputSnafu { path })?;
    Ok(())
}
