//! Terminal report of pod address allocations.

use crate::error::IpamError;
use colored::Colorize;
use ipnet::IpNet;
use itertools::Itertools;

/// Result of one `allocate_next_ips` call, for printing.
#[derive(Debug)]
pub struct AllocationRow {
    /// Node the addresses were requested for.
    pub node: String,
    /// 1-based allocation round.
    pub round: usize,
    /// Allocated addresses or the allocation error.
    pub result: Result<Vec<IpNet>, IpamError>,
}

/// Column widths of the report, including the quotes.
pub const NODE_WIDTH: usize = 12;
pub const ROUND_WIDTH: usize = 5;
pub const ADDRESS_WIDTH: usize = 30;

/// Quote `value` and pad it on the left to `width`; longer values are kept whole.
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let quoted = format!("\"{}\"", value.to_string());
    format!("{quoted:>width$}")
}

/// Format one report row without colours.
pub fn format_row(row: &AllocationRow) -> String {
    let detail = match &row.result {
        Ok(ips) if ips.is_empty() => "no host subnet".to_string(),
        Ok(ips) => ips.iter().join(", "),
        Err(e) => e.to_string(),
    };
    format!(
        "{}, {}, {}",
        format_field(&row.node, NODE_WIDTH),
        format_field(row.round, ROUND_WIDTH),
        format_field(detail, ADDRESS_WIDTH)
    )
}

/// Print the allocation report to stdout.
pub fn print_allocations(rows: &[AllocationRow]) {
    println!(
        "{}, {}, {}",
        format_field("node", NODE_WIDTH),
        format_field("cnt", ROUND_WIDTH),
        format_field("addresses", ADDRESS_WIDTH)
    );
    for row in rows {
        let line = format_row(row);
        match row.result {
            Ok(_) => println!("{line}"),
            Err(_) => println!("{}", line.red()),
        }
    }
    let failed = rows.iter().filter(|r| r.result.is_err()).count();
    if failed > 0 {
        println!("#{}# {failed} allocation(s) failed", "NOTE".on_red());
    }
}
