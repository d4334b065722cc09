use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use intake_cli::replay::ReplayStep;
use intake_model::{
    Activity, ActivityStatus, FieldMapping, MappingStatus, Severity, StepDescriptor, StepStatus,
    SummaryReport, ValidationFinding,
};
use intake_wizard::{ActivityLedger, Outcome};

use crate::commands::RunResult;

pub fn print_run(result: &RunResult) {
    println!("Session: {} ({})", result.user, result.account);
    for step in &result.steps {
        print_replay_step(step);
    }

    if !result.mappings.is_empty() {
        println!();
        println!("Mappings ({}):", result.active_module.label());
        println!("{}", mapping_table(&result.mappings));
    }
    if !result.findings.is_empty() {
        println!();
        println!("Findings:");
        println!("{}", finding_table(&result.findings));
    }
    for report in result.steps.iter().filter_map(|s| s.committed.as_ref()) {
        println!();
        println!("Committed: {}", report.module.data_label());
        println!("{}", report_table(report));
    }
    if !result.ledger.is_empty() {
        println!();
        println!("Activities:");
        println!("{}", activity_table(&result.ledger));
    }

    let refused = result.refused();
    if refused > 0 {
        eprintln!("{refused} action(s) refused");
    }
}

fn print_replay_step(step: &ReplayStep) {
    let marker = match &step.outcome {
        Outcome::Advanced { .. } | Outcome::Stayed => "ok",
        Outcome::Blocked { .. } => "refused",
        Outcome::Ignored { .. } => "ignored",
    };
    println!(
        "{:>3}. [{}] {} ({marker}: {})",
        step.index, step.module, step.action, step.outcome
    );
    println!("     {}", tracker_line(&step.steps));
}

/// One-line progress tracker, e.g. `[x] Data Upload > [>] Auto Mapping > ...`.
pub fn tracker_line(steps: &[StepDescriptor]) -> String {
    steps
        .iter()
        .map(|step| {
            let mark = match step.status {
                StepStatus::Completed => "x",
                StepStatus::Current => ">",
                StepStatus::Pending => " ",
                StepStatus::Error => "!",
            };
            format!("[{mark}] {} ({})", step.title, step.description)
        })
        .collect::<Vec<_>>()
        .join(" > ")
}

fn mapping_table(mappings: &[FieldMapping]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Source"),
        header_cell("Target"),
        header_cell("Status"),
        header_cell("Confidence"),
        header_cell("Type"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    for mapping in mappings {
        table.add_row(vec![
            Cell::new(&mapping.id),
            Cell::new(&mapping.source_field),
            match &mapping.mapped_field {
                Some(target) => Cell::new(target),
                None => dim_cell("-"),
            },
            status_cell(mapping.status),
            match mapping.confidence {
                Some(confidence) => Cell::new(confidence),
                None => dim_cell("-"),
            },
            Cell::new(mapping.data_type),
        ]);
    }
    table
}

fn finding_table(findings: &[ValidationFinding]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Severity"),
        header_cell("Field"),
        header_cell("Message"),
        header_cell("Suggestion"),
    ]);
    apply_wide_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for finding in findings {
        table.add_row(vec![
            Cell::new(&finding.id),
            severity_cell(finding.severity),
            Cell::new(&finding.field),
            Cell::new(&finding.message),
            match &finding.suggestion {
                Some(suggestion) => Cell::new(suggestion),
                None => dim_cell("-"),
            },
        ]);
    }
    table
}

fn report_table(report: &SummaryReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Source file"), Cell::new(&report.source_file_name)]);
    table.add_row(vec![Cell::new("Total fields"), Cell::new(report.total_fields)]);
    table.add_row(vec![
        Cell::new("Mapped"),
        Cell::new(format!(
            "{} ({}%)",
            report.mapped_fields,
            report.mapping_percentage()
        )),
    ]);
    table.add_row(vec![
        Cell::new("Unmapped"),
        count_cell(report.unmapped_fields, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Validations passed"),
        Cell::new(format!(
            "{} ({}%)",
            report.validations_passed,
            report.validation_percentage()
        )),
    ]);
    table.add_row(vec![
        Cell::new("Validations failed"),
        count_cell(report.validations_failed, Color::Red),
    ]);
    table.add_row(vec![
        Cell::new("Timestamp"),
        Cell::new(report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")),
    ]);
    table
}

fn activity_table(ledger: &ActivityLedger) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Activity"),
        header_cell("Account"),
        header_cell("Module"),
        header_cell("Status"),
        header_cell("Records"),
        header_cell("Description"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    for Activity {
        id,
        account_number,
        module,
        status,
        records_processed,
        description,
        ..
    } in ledger.activities()
    {
        table.add_row(vec![
            dim_cell(id),
            Cell::new(account_number.as_str()),
            Cell::new(module.label()),
            activity_status_cell(*status),
            Cell::new(records_processed),
            Cell::new(description),
        ]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_wide_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(status: MappingStatus) -> Cell {
    match status {
        MappingStatus::Mapped => Cell::new("mapped").fg(Color::Green),
        MappingStatus::Partial => Cell::new("partial").fg(Color::Yellow),
        MappingStatus::Unmapped => dim_cell("unmapped"),
        MappingStatus::Error => Cell::new("error")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn activity_status_cell(status: ActivityStatus) -> Cell {
    match status {
        ActivityStatus::Completed => Cell::new("completed").fg(Color::Green),
        ActivityStatus::InProgress => Cell::new("in progress").fg(Color::Yellow),
        ActivityStatus::Pending => dim_cell("pending"),
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("ERROR")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
        Severity::Info => Cell::new("INFO").fg(Color::Blue),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
