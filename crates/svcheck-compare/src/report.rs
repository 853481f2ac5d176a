use serde::{Deserialize, Serialize};
use svcheck_core::{NodeId, Stage};

use crate::reconcile::{AngleReferenceCorrection, NodeRecord, Reconciliation};

/// Number of columns in a detail row.
pub const DETAIL_COLUMNS: usize = 23;

/// One detail line per topological node. `None` cells are written blank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRow {
    #[serde(rename = "Topological Node")]
    pub node: String,
    #[serde(rename = "VL ID")]
    pub voltage_level_id: String,
    #[serde(rename = "IIDM bus ID")]
    pub bus_id: String,
    #[serde(rename = "Equipment ID")]
    pub equipment_id: String,
    #[serde(rename = "numcnx")]
    pub connected_component: u32,
    pub v: Option<f64>,
    #[serde(rename = "v_after_import_SSH")]
    pub v_import_ssh: Option<f64>,
    #[serde(rename = "v_after_lf_SSH")]
    pub v_lf_ssh: Option<f64>,
    #[serde(rename = "v_after_import_SV")]
    pub v_import_sv: Option<f64>,
    #[serde(rename = "v_after_lf_SV")]
    pub v_lf_sv: Option<f64>,
    pub angle: Option<f64>,
    #[serde(rename = "angle_after_import_SSH")]
    pub angle_import_ssh: Option<f64>,
    #[serde(rename = "angle_after_lf_SSH")]
    pub angle_lf_ssh: Option<f64>,
    #[serde(rename = "angle_after_import_SV")]
    pub angle_import_sv: Option<f64>,
    #[serde(rename = "angle_after_lf_SV")]
    pub angle_lf_sv: Option<f64>,
    #[serde(rename = "diff_v_after_import_SSH")]
    pub diff_v_import_ssh: Option<f64>,
    #[serde(rename = "diff_v_after_lf_SSH")]
    pub diff_v_lf_ssh: Option<f64>,
    #[serde(rename = "diff_v_after_import_SV")]
    pub diff_v_import_sv: Option<f64>,
    #[serde(rename = "diff_v_after_lf_SV")]
    pub diff_v_lf_sv: Option<f64>,
    #[serde(rename = "diff_angle_after_import_SSH")]
    pub diff_angle_import_ssh: Option<f64>,
    #[serde(rename = "diff_angle_after_lf_SSH")]
    pub diff_angle_lf_ssh: Option<f64>,
    #[serde(rename = "diff_angle_after_import_SV")]
    pub diff_angle_import_sv: Option<f64>,
    #[serde(rename = "diff_angle_after_lf_SV")]
    pub diff_angle_lf_sv: Option<f64>,
}

impl DetailRow {
    pub fn from_record(
        node: &NodeId,
        record: &NodeRecord,
        correction: &AngleReferenceCorrection,
    ) -> Self {
        let diffs = crate::reconcile::node_diffs(record, correction);
        let meta = &record.metadata;
        Self {
            node: node.to_string(),
            voltage_level_id: meta.voltage_level_id.clone(),
            bus_id: meta.bus_id.clone(),
            equipment_id: meta.equipment_id.clone(),
            connected_component: meta.connected_component,
            v: record.voltage(Stage::Baseline),
            v_import_ssh: record.voltage(Stage::ImportSsh),
            v_lf_ssh: record.voltage(Stage::LoadFlowSsh),
            v_import_sv: record.voltage(Stage::ImportSv),
            v_lf_sv: record.voltage(Stage::LoadFlowSv),
            angle: record.angle(Stage::Baseline),
            angle_import_ssh: record.angle(Stage::ImportSsh),
            angle_lf_ssh: record.angle(Stage::LoadFlowSsh),
            angle_import_sv: record.angle(Stage::ImportSv),
            angle_lf_sv: record.angle(Stage::LoadFlowSv),
            diff_v_import_ssh: diffs.v[0],
            diff_v_lf_ssh: diffs.v[1],
            diff_v_import_sv: diffs.v[2],
            diff_v_lf_sv: diffs.v[3],
            diff_angle_import_ssh: diffs.angle[0],
            diff_angle_lf_ssh: diffs.angle[1],
            diff_angle_import_sv: diffs.angle[2],
            diff_angle_lf_sv: diffs.angle[3],
        }
    }
}

/// One line of the batch summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseSummary {
    pub case_file: String,
    pub provider: String,
    pub topology: Option<String>,
    /// First error that stopped the case, if any
    pub error: Option<String>,
    pub load_flow_status: Option<String>,
    pub ssh_max_diff_v: Option<f64>,
    pub sv_max_diff_v: Option<f64>,
}

impl CaseSummary {
    pub fn new(case_file: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            case_file: case_file.into(),
            provider: provider.into(),
            ..Self::default()
        }
    }

    /// "OK" or the recorded error text.
    pub fn import_status(&self) -> &str {
        self.error.as_deref().unwrap_or("OK")
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn row(&self) -> SummaryRow {
        SummaryRow {
            case_file: self.case_file.clone(),
            provider: self.provider.clone(),
            topology: self.topology.clone().unwrap_or_default(),
            import_status: self.import_status().to_string(),
            load_flow_status: self.load_flow_status.clone().unwrap_or_default(),
            ssh_max_diff_v: self.ssh_max_diff_v,
            sv_max_diff_v: self.sv_max_diff_v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    #[serde(rename = "Case file")]
    pub case_file: String,
    #[serde(rename = "Provider")]
    pub provider: String,
    #[serde(rename = "Topology")]
    pub topology: String,
    #[serde(rename = "Import status")]
    pub import_status: String,
    #[serde(rename = "PowerFlow status")]
    pub load_flow_status: String,
    #[serde(rename = "SSH max diff V")]
    pub ssh_max_diff_v: Option<f64>,
    #[serde(rename = "SV max diff V")]
    pub sv_max_diff_v: Option<f64>,
}

/// Everything produced for one case: the summary line and, unless the case
/// stopped before reconciliation, the joined node records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonReport {
    pub summary: CaseSummary,
    reconciliation: Reconciliation,
}

impl ComparisonReport {
    pub fn new(mut summary: CaseSummary, reconciliation: Reconciliation) -> Self {
        summary.ssh_max_diff_v = reconciliation.max_voltage_diff(Stage::LoadFlowSsh);
        summary.sv_max_diff_v = reconciliation.max_voltage_diff(Stage::LoadFlowSv);
        Self {
            summary,
            reconciliation,
        }
    }

    /// A case that stopped before any comparison; it has no detail rows.
    pub fn failed(summary: CaseSummary) -> Self {
        Self {
            summary,
            reconciliation: Reconciliation::default(),
        }
    }

    pub fn reconciliation(&self) -> &Reconciliation {
        &self.reconciliation
    }

    pub fn correction(&self) -> &AngleReferenceCorrection {
        self.reconciliation.correction()
    }

    pub fn rows(&self) -> Vec<DetailRow> {
        let correction = self.reconciliation.correction();
        self.reconciliation
            .records()
            .map(|(node, record)| DetailRow::from_record(node, record, correction))
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.reconciliation.len()
    }
}
