//! State-variables snapshot writer.
//!
//! Produces the RDF/XML document that [`crate::sv_reader`] consumes: a
//! `md:FullModel` header followed by one `cim:SvVoltage` per node.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use chrono::{DateTime, Utc};
use svcheck_core::{ModelHeader, NodeState, SvResult};

const DESCRIPTION: &str = "State variables re-exported for validation";

#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    pub version: String,
    pub created: DateTime<Utc>,
    pub created_by: String,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            version: "002".to_string(),
            created: Utc::now(),
            created_by: "svcheck".to_string(),
        }
    }
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn write_sv_snapshot<W: Write>(
    writer: &mut W,
    header: &ModelHeader,
    states: &[NodeState],
    options: &SnapshotOptions,
) -> SvResult<()> {
    write_root_open(writer)?;
    write_full_model(writer, header, options)?;
    for (counter, state) in states.iter().enumerate() {
        writeln!(writer, "  <cim:SvVoltage rdf:ID=\"{counter}\">")?;
        writeln!(writer, "    <cim:SvVoltage.angle>{}</cim:SvVoltage.angle>", state.angle)?;
        writeln!(writer, "    <cim:SvVoltage.v>{}</cim:SvVoltage.v>", state.v)?;
        writeln!(
            writer,
            "    <cim:SvVoltage.TopologicalNode rdf:resource=\"#{}\" />",
            xml_escape(state.node.as_str())
        )?;
        writeln!(writer, "  </cim:SvVoltage>")?;
    }
    write!(writer, "</rdf:RDF>")?;
    Ok(())
}

/// Write a snapshot file, creating its parent directory.
pub fn write_sv_file(
    path: &Path,
    header: &ModelHeader,
    states: &[NodeState],
    options: &SnapshotOptions,
) -> SvResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_sv_snapshot(&mut writer, header, states, options)?;
    writer.flush()?;
    Ok(())
}

fn write_root_open(writer: &mut impl Write) -> SvResult<()> {
    writeln!(writer, "\u{feff}<?xml version=\"1.0\" encoding=\"utf-8\"?>")?;
    write!(writer, "<rdf:RDF xmlns:cim=\"http://iec.ch/TC57/2013/CIM-schema-cim16#\"")?;
    write!(writer, " xmlns:md=\"http://iec.ch/TC57/61970-552/ModelDescription/1#\"")?;
    write!(writer, " xmlns:entsoe=\"http://entsoe.eu/CIM/SchemaExtension/3/1#\"")?;
    writeln!(writer, " xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">")?;
    Ok(())
}

fn write_full_model(
    writer: &mut impl Write,
    header: &ModelHeader,
    options: &SnapshotOptions,
) -> SvResult<()> {
    let stamp = options.created.format("%Y-%m-%dT%H:%M:%SZ");
    let about = header.sv_model_id.as_deref().unwrap_or("MISSING_SV");
    writeln!(writer, "  <md:FullModel rdf:about=\"{}\">", xml_escape(about))?;
    writeln!(writer, "    <md:Model.created>{stamp}</md:Model.created>")?;
    writeln!(
        writer,
        "    <md:Model.createdBy>{}</md:Model.createdBy>",
        xml_escape(&options.created_by)
    )?;
    writeln!(writer, "    <md:Model.scenarioTime>{stamp}</md:Model.scenarioTime>")?;
    writeln!(
        writer,
        "    <md:Model.description>{DESCRIPTION}</md:Model.description>"
    )?;
    writeln!(
        writer,
        "    <md:Model.modelingAuthoritySet>{}</md:Model.modelingAuthoritySet>",
        xml_escape(&options.created_by)
    )?;
    writeln!(
        writer,
        "    <md:Model.profile>http://entsoe.eu/CIM/StateVariables/4/1</md:Model.profile>"
    )?;
    writeln!(
        writer,
        "    <md:Model.version>{}</md:Model.version>",
        xml_escape(&options.version)
    )?;
    for (model, placeholder) in [
        (&header.eq_model_id, "MISSING_EQ"),
        (&header.tp_model_id, "MISSING_TP"),
        (&header.ssh_model_id, "MISSING_SSH"),
    ] {
        let id = model.as_deref().unwrap_or(placeholder);
        writeln!(
            writer,
            "    <md:Model.DependentOn rdf:resource=\"{}\"/>",
            xml_escape(id)
        )?;
    }
    writeln!(writer, "  </md:FullModel>")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sv_reader::parse_voltages;
    use chrono::TimeZone;

    fn options() -> SnapshotOptions {
        SnapshotOptions {
            version: "002".into(),
            created: Utc.with_ymd_and_hms(2020, 1, 15, 10, 30, 0).unwrap(),
            created_by: "svcheck".into(),
        }
    }

    #[test]
    fn header_lists_dependencies_with_placeholders() {
        let header = ModelHeader {
            sv_model_id: Some("urn:uuid:sv-1".into()),
            eq_model_id: Some("urn:uuid:eq-1".into()),
            tp_model_id: None,
            ssh_model_id: None,
        };
        let mut buffer = Vec::new();
        write_sv_snapshot(&mut buffer, &header, &[], &options()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with('\u{feff}'));
        assert!(text.contains("<md:FullModel rdf:about=\"urn:uuid:sv-1\">"));
        assert!(text.contains("<md:Model.created>2020-01-15T10:30:00Z</md:Model.created>"));
        assert!(text.contains("rdf:resource=\"urn:uuid:eq-1\""));
        assert!(text.contains("rdf:resource=\"MISSING_TP\""));
        assert!(text.contains("rdf:resource=\"MISSING_SSH\""));
        assert!(text.ends_with("</rdf:RDF>"));
    }

    #[test]
    fn written_snapshot_reads_back() {
        let states = vec![
            NodeState {
                node: "_TN1".into(),
                v: 404.3,
                angle: -12.5,
            },
            NodeState {
                node: "_TN2".into(),
                v: 226.1,
                angle: 0.0,
            },
        ];
        let mut buffer = Vec::new();
        write_sv_snapshot(&mut buffer, &ModelHeader::default(), &states, &options()).unwrap();
        let load = parse_voltages(&String::from_utf8(buffer).unwrap()).unwrap();
        let order: Vec<&str> = load.samples.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, vec!["_TN1", "_TN2"]);
        assert_eq!(load.samples.get("_TN1").unwrap().angle, -12.5);
        assert!(load.diagnostics.is_empty());
    }

    #[test]
    fn unsolved_nodes_are_skipped_on_read() {
        let states = vec![NodeState {
            node: "_TN9".into(),
            v: f64::NAN,
            angle: f64::NAN,
        }];
        let mut buffer = Vec::new();
        write_sv_snapshot(&mut buffer, &ModelHeader::default(), &states, &options()).unwrap();
        let load = parse_voltages(&String::from_utf8(buffer).unwrap()).unwrap();
        assert!(load.samples.is_empty());
        assert_eq!(load.diagnostics.warning_count(), 1);
    }
}
