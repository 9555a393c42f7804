//! Grouping - folds sheet rows into measurement records.
//!
//! Rows sharing project, execution date and sheet number form one record.
//! The first row of a key sets every header field; each row, the first one
//! included, appends one line item and adds its total-price cell to the
//! record total.
//!
//! This function is DETERMINISTIC: same rows = same records, in first-seen
//! key order.

use crate::cell::CellValue;
use crate::dates::normalize_date;
use crate::loader::Row;
use crate::model::{
    ClassificationCodes, Criterion, LineItem, Measurement, Priority, Status, FIELD_NAMES,
};
use std::collections::{BTreeMap, HashMap};

/// Column names read from the sheet, after header trimming.
pub mod columns {
    pub const PROJECT: &str = "Projeto";
    pub const CLIENT: &str = "Concessionaria";
    pub const CONTRACT: &str = "Contrato";
    pub const PROJECT_TYPE: &str = "Tipo_Projeto";
    pub const LOCALITY: &str = "Localidade";
    pub const REGION: &str = "Regional";
    pub const CF: &str = "CF";
    pub const PI: &str = "PI";
    pub const NTC: &str = "NTC";
    pub const RESERVE: &str = "Reserva";
    pub const CIRCUIT: &str = "Circuito";
    pub const KS: &str = "KS";
    pub const ZONE: &str = "Zona";
    pub const OBSERVATION: &str = "Observacao";
    pub const EXECUTION_DATE: &str = "Data_Execucao";
    pub const SUBMISSION_DATE: &str = "Data_Envio_Folha_Medicao";
    pub const TECHNICIAN: &str = "Tecnico_Responsavel_Concessionaria";
    pub const STATUS: &str = "Status";
    pub const SHEET_NUMBER: &str = "Numero_Folha_Medicao";
    pub const MEASURE_INDEX: &str = "Numero_Medida_Folha_Medicao";
    pub const MASTER_CODE: &str = "Codigo_Mestre";
    pub const DESCRIPTION: &str = "Descricao_Item";
    pub const QUANTITY: &str = "Quantidade";
    pub const UNIT: &str = "Unidade_Medida";
    pub const UNIT_PRICE: &str = "Valor_Unitario";
    pub const TOTAL_PRICE: &str = "Valor_Total";
    pub const SERVICE_TYPE: &str = "Tipo_Servico";
    pub const EXPENDITURE: &str = "Dispendio";

    /// Every column with a dedicated field in the output.
    pub const KNOWN: &[&str] = &[
        PROJECT, CLIENT, CONTRACT, PROJECT_TYPE, LOCALITY, REGION, CF, PI, NTC, RESERVE,
        CIRCUIT, KS, ZONE, OBSERVATION, EXECUTION_DATE, SUBMISSION_DATE, TECHNICIAN, STATUS,
        SHEET_NUMBER, MEASURE_INDEX, MASTER_CODE, DESCRIPTION, QUANTITY, UNIT, UNIT_PRICE,
        TOTAL_PRICE, SERVICE_TYPE, EXPENDITURE,
    ];
}

use columns::*;

/// Key component used when the execution date is empty or unreadable.
pub const NO_DATE: &str = "sem-data";
/// Key component used when the sheet number is empty.
pub const NO_SHEET: &str = "";
pub const KEY_SEPARATOR: char = '_';

const DEFAULT_LOCALITY: &str = "N/A";
const DEFAULT_REGION: &str = "Não informado";
const DEFAULT_UNIT: &str = "un";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupOptions {
    /// Copy unrecognized columns into each record.
    pub keep_extra_columns: bool,
}

/// Composite key `project_date_sheet`. Never fails: missing components
/// fall back to [`NO_DATE`] and [`NO_SHEET`].
pub fn grouping_key(row: &Row) -> String {
    let project = row.text(PROJECT);
    let date = normalize_date(row.get(EXECUTION_DATE))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| NO_DATE.to_string());
    let sheet = row.text_or(SHEET_NUMBER, NO_SHEET);

    format!(
        "{}{sep}{}{sep}{}",
        project.trim(),
        date,
        sheet.trim(),
        sep = KEY_SEPARATOR
    )
}

/// Records being built, in first-seen key order.
#[derive(Debug, Default)]
pub struct Accumulator {
    index: HashMap<String, usize>,
    records: Vec<Measurement>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one row into the accumulator.
    pub fn push(mut self, row: &Row, options: &GroupOptions) -> Self {
        let records = &mut self.records;
        let slot = *self
            .index
            .entry(grouping_key(row))
            .or_insert_with_key(|key| {
                records.push(new_measurement(row, key.clone(), options));
                records.len() - 1
            });

        let record = &mut self.records[slot];
        record.items.push(line_item(row));
        record.total_value += row.number(TOTAL_PRICE);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn finish(self) -> Vec<Measurement> {
        self.records
    }
}

/// Group rows into measurement records.
pub fn group_rows(rows: &[Row], options: &GroupOptions) -> Vec<Measurement> {
    rows.iter()
        .fold(Accumulator::new(), |acc, row| acc.push(row, options))
        .finish()
}

fn new_measurement(row: &Row, grouping_key: String, options: &GroupOptions) -> Measurement {
    let execution_date = normalize_date(row.get(EXECUTION_DATE));
    let submission_date = normalize_date(row.get(SUBMISSION_DATE));

    let locality = [LOCALITY, REGION]
        .iter()
        .map(|column| row.get(column))
        .find(|cell| !cell.is_falsy())
        .map(CellValue::to_text)
        .unwrap_or_else(|| DEFAULT_LOCALITY.to_string());

    Measurement {
        project_id: row.text(PROJECT).trim().to_string(),
        sheet: row.text_or(SHEET_NUMBER, ""),
        client: row.text(CLIENT).trim().to_string(),
        contract: row.text(CONTRACT),
        project_type: row.text(PROJECT_TYPE),
        locality,
        region: row.text_or(REGION, DEFAULT_REGION),
        codes: ClassificationCodes {
            cf: row.text_or(CF, ""),
            pi: row.text_or(PI, ""),
            ntc: row.text_or(NTC, ""),
            reserve: row.text_or(RESERVE, ""),
            circuit: row.text_or(CIRCUIT, ""),
            ks: row.text_or(KS, ""),
            zone: row.text_or(ZONE, ""),
            observation: row.text_or(OBSERVATION, ""),
        },
        items: Vec::new(),
        total_value: 0.0,
        status: Status::from_label(&row.text(STATUS)),
        priority: Priority::default(),
        documents: Vec::new(),
        execution_date,
        submission_date,
        response_date: None,
        technician: row.text_or(TECHNICIAN, ""),
        measure_index: measure_index(row.get(MEASURE_INDEX)),
        approval_deadline: submission_date,
        grouping_key,
        raw_execution_date: row.get(EXECUTION_DATE).clone(),
        extra: if options.keep_extra_columns {
            extra_columns(row)
        } else {
            BTreeMap::new()
        },
    }
}

fn line_item(row: &Row) -> LineItem {
    LineItem {
        code: row.text(MASTER_CODE),
        description: row.text(DESCRIPTION),
        quantity: row.number(QUANTITY),
        unit: row.text_or(UNIT, DEFAULT_UNIT),
        unit_price: row.number(UNIT_PRICE),
        criterion: Criterion::Executed,
        service_type: row.text_or(SERVICE_TYPE, ""),
        expenditure: row.text_or(EXPENDITURE, ""),
        unit_of_measure: row.text_or(UNIT, ""),
        observation: row.text_or(OBSERVATION, ""),
    }
}

/// Empty index means the first measure of the sheet; non-numeric or
/// negative input is 0.
fn measure_index(cell: &CellValue) -> u32 {
    if cell.is_falsy() {
        return 1;
    }
    let n = cell.to_number();
    if n >= 0.0 {
        n as u32
    } else {
        0
    }
}

/// Prefix for extension columns whose name is already a record field.
pub const EXTRA_PREFIX: &str = "extra_";

/// Unrecognized columns keyed by header. A header equal to a record field
/// (`status`, `valorTotal`, ...) is stored as `extra_<header>` so every
/// JSON key stays unique; the prefix repeats until the key is free.
fn extra_columns(row: &Row) -> BTreeMap<String, serde_json::Value> {
    let as_json = |value: &CellValue| serde_json::to_value(value).unwrap_or_default();

    let (mut colliding, free): (Vec<_>, Vec<_>) = row
        .cells()
        .filter(|(name, _)| !KNOWN.contains(name))
        .partition(|(name, _)| FIELD_NAMES.contains(name));

    let mut extra: BTreeMap<String, serde_json::Value> = free
        .into_iter()
        .map(|(name, value)| (name.to_string(), as_json(value)))
        .collect();

    // Row cells are unordered; sort so renames are stable across runs
    colliding.sort_by_key(|(name, _)| *name);
    for (name, value) in colliding {
        let mut key = format!("{}{}", EXTRA_PREFIX, name);
        while extra.contains_key(&key) || FIELD_NAMES.contains(&key.as_str()) {
            key.insert_str(0, EXTRA_PREFIX);
        }
        extra.insert(key, as_json(value));
    }
    extra
}

/// Totals printed after a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub rows: usize,
    pub records: usize,
    pub line_items: usize,
    pub total_value: f64,
    pub by_status: BTreeMap<Status, usize>,
    pub without_date: usize,
}

impl Summary {
    pub fn from_records(rows: usize, records: &[Measurement]) -> Self {
        let mut summary = Summary {
            rows,
            records: records.len(),
            ..Default::default()
        };
        for record in records {
            summary.line_items += record.items.len();
            summary.total_value += record.total_value;
            *summary.by_status.entry(record.status).or_default() += 1;
            if record.execution_date.is_none() {
                summary.without_date += 1;
            }
        }
        summary
    }
}
