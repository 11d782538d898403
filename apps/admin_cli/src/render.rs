use client_core::{AppContext, ColorMode, DialogView, EmployeePage};
use shared::query::QueryState;

const RULE_WIDTH: usize = 76;

pub fn paint(ctx: &AppContext, line: &str) -> String {
    match ctx.color_mode {
        ColorMode::Light => line.to_string(),
        ColorMode::Dark => format!("\x1b[97;40m{line}\x1b[0m"),
    }
}

/// Singapore dollars with thousands grouping, e.g. `SGD 19,234.50`.
pub fn format_salary(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}SGD {grouped}.{cents}")
}

pub fn dialog_lines(dialog: &DialogView) -> Vec<String> {
    let buttons = dialog
        .buttons
        .iter()
        .map(|button| format!("[{}]", button.label))
        .collect::<Vec<_>>()
        .join(" ");
    vec![
        format!("== {} ==", dialog.title),
        dialog.content.clone(),
        buttons,
    ]
}

pub fn grid_lines(page: &EmployeePage, query: &QueryState) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{:<10} {:<16} {:<30} {:>16}",
            "ID", "Login", "Name", "Salary"
        ),
        "-".repeat(RULE_WIDTH),
    ];
    lines.extend(page.records.iter().map(|record| {
        format!(
            "{:<10} {:<16} {:<30} {:>16}",
            record.id.as_str(),
            record.login,
            record.name,
            format_salary(record.salary)
        )
    }));
    if page.records.is_empty() {
        lines.push("(no employees)".to_string());
        return lines;
    }
    let first = query.offset.saturating_add(1);
    let last = query.offset.saturating_add(page.records.len() as u64);
    lines.push(format!(
        "rows {first}-{last} of {} (sorted {})",
        page.total, query.sort
    ));
    lines
}

pub fn print_dialog(ctx: &AppContext, dialog: &DialogView) {
    for line in dialog_lines(dialog) {
        println!("{}", paint(ctx, &line));
    }
}

pub fn print_grid(ctx: &AppContext, page: &EmployeePage, query: &QueryState) {
    for line in grid_lines(page, query) {
        println!("{}", paint(ctx, &line));
    }
}
