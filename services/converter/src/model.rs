//! Output records, serialized with the field names the dashboard reads.

use crate::cell::CellValue;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Workflow status of a measurement sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Status {
    #[serde(rename = "pendente_envio")]
    PendingSubmission,
    #[default]
    #[serde(rename = "aguardando_aprovacao")]
    AwaitingApproval,
    #[serde(rename = "aprovado")]
    Approved,
    #[serde(rename = "reprovado")]
    Rejected,
    #[serde(rename = "correcao")]
    Correction,
}

/// Labels used in the `Status` column. Matching is exact.
const STATUS_LABELS: &[(&str, Status)] = &[
    ("Em Análise", Status::AwaitingApproval),
    ("Pendente", Status::PendingSubmission),
    ("Aprovado", Status::Approved),
    ("Reprovado", Status::Rejected),
    ("Correção", Status::Correction),
];

impl Status {
    /// Map a status label from the sheet. Unknown labels, including the
    /// empty string, are awaiting approval.
    pub fn from_label(label: &str) -> Self {
        STATUS_LABELS
            .iter()
            .find(|(known, _)| *known == label)
            .map(|(_, status)| *status)
            .unwrap_or_default()
    }

    pub fn code(self) -> &'static str {
        match self {
            Status::PendingSubmission => "pendente_envio",
            Status::AwaitingApproval => "aguardando_aprovacao",
            Status::Approved => "aprovado",
            Status::Rejected => "reprovado",
            Status::Correction => "correcao",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Priority {
    #[serde(rename = "baixa")]
    Low,
    #[default]
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "alta")]
    High,
}

/// How a line item was measured. The converter only emits `Executed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Criterion {
    #[serde(rename = "equipamento")]
    Equipment,
    #[default]
    #[serde(rename = "executado")]
    Executed,
    #[serde(rename = "documentado")]
    Documented,
}

/// Attachment metadata. Documents are added in the dashboard, so the
/// converter always writes an empty list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "data")]
    pub date: NaiveDate,
    pub url: String,
}

/// One service or material entry of a measurement sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "quantidade")]
    pub quantity: f64,
    #[serde(rename = "unidade")]
    pub unit: String,
    #[serde(rename = "precoUnitario")]
    pub unit_price: f64,
    #[serde(rename = "criterio")]
    pub criterion: Criterion,
    #[serde(rename = "tipoServico")]
    pub service_type: String,
    #[serde(rename = "dispendio")]
    pub expenditure: String,
    #[serde(rename = "unidadeMedida")]
    pub unit_of_measure: String,
    #[serde(rename = "observacao")]
    pub observation: String,
}

/// Classification codes copied from the first row of a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassificationCodes {
    pub cf: String,
    pub pi: String,
    pub ntc: String,
    #[serde(rename = "reserva")]
    pub reserve: String,
    #[serde(rename = "circuito")]
    pub circuit: String,
    pub ks: String,
    #[serde(rename = "zona")]
    pub zone: String,
    #[serde(rename = "observacao")]
    pub observation: String,
}

/// JSON keys a [`Measurement`] writes, flattened codes included. Extension
/// columns must not reuse them.
pub const FIELD_NAMES: &[&str] = &[
    "idSistema",
    "folha",
    "cliente",
    "contrato",
    "tipoProjeto",
    "local",
    "regional",
    "cf",
    "pi",
    "ntc",
    "reserva",
    "circuito",
    "ks",
    "zona",
    "observacao",
    "atividades",
    "valorTotal",
    "status",
    "prioridade",
    "documentos",
    "dataExecucao",
    "dataEnvio",
    "dataResposta",
    "responsavel",
    "medida",
    "prazoAprovacao",
    "chaveAgrupamento",
    "dataExecucaoOriginal",
];

/// A measurement sheet: every row sharing project, execution date and
/// sheet number.
///
/// `total_value` is the sum of the rows' total-price cells. It is never
/// reconciled with quantity times unit price of `items`; the two figures
/// can differ and both are kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    #[serde(rename = "idSistema")]
    pub project_id: String,
    #[serde(rename = "folha")]
    pub sheet: String,
    #[serde(rename = "cliente")]
    pub client: String,
    #[serde(rename = "contrato")]
    pub contract: String,
    #[serde(rename = "tipoProjeto")]
    pub project_type: String,
    #[serde(rename = "local")]
    pub locality: String,
    #[serde(rename = "regional")]
    pub region: String,
    #[serde(flatten)]
    pub codes: ClassificationCodes,
    #[serde(rename = "atividades")]
    pub items: Vec<LineItem>,
    #[serde(rename = "valorTotal")]
    pub total_value: f64,
    pub status: Status,
    #[serde(rename = "prioridade")]
    pub priority: Priority,
    #[serde(rename = "documentos")]
    pub documents: Vec<Document>,
    #[serde(rename = "dataExecucao")]
    pub execution_date: Option<NaiveDate>,
    #[serde(rename = "dataEnvio")]
    pub submission_date: Option<NaiveDate>,
    #[serde(rename = "dataResposta")]
    pub response_date: Option<NaiveDate>,
    #[serde(rename = "responsavel")]
    pub technician: String,
    #[serde(rename = "medida")]
    pub measure_index: u32,
    #[serde(rename = "prazoAprovacao")]
    pub approval_deadline: Option<NaiveDate>,
    #[serde(rename = "chaveAgrupamento")]
    pub grouping_key: String,
    #[serde(rename = "dataExecucaoOriginal")]
    pub raw_execution_date: CellValue,
    /// Unrecognized columns, only filled with `--keep-extra-columns`.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}
