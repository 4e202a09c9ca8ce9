pub mod ui;

use crate::core::entry::LedgerEntry;
use crate::store::Page;
use comfy_table::Cell;

/// Renders one page of ledger history as a table, newest first.
pub fn ledger_table(page: &Page<LedgerEntry>) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Reference"),
        ui::header_cell("Kind"),
        ui::header_cell("Asset"),
        ui::header_cell("Amount"),
        ui::header_cell("Fee"),
        ui::header_cell("Rate"),
    ]);

    for entry in &page.items {
        let rate = entry
            .rate
            .map_or("-".to_string(), |rate| rate.to_string());
        table.add_row(vec![
            Cell::new(&entry.reference),
            Cell::new(entry.kind.to_string()),
            Cell::new(&entry.asset),
            ui::amount_cell(&entry.amount.to_string()),
            ui::amount_cell(&entry.fee.to_string()),
            ui::amount_cell(&rate),
        ]);
    }

    format!(
        "{table}\n\nPage {} ({} of {} entries)",
        page.page,
        page.items.len(),
        page.total
    )
}
