//! StageLoader: reads the "voltages" result set of a state-variables
//! snapshot.
//!
//! Each `cim:SvVoltage` element contributes one sample keyed by the id of
//! its `SvVoltage.TopologicalNode` reference. Records without that reference
//! are dropped silently, unless no record in the document carries one: the
//! result set then has no node column at all and the snapshot is malformed.
//! Records with a node but an absent or non-numeric `v`/`angle` are dropped
//! with a warning diagnostic; they never take the rest of the stage down.

use std::{fs, path::Path};

use quick_xml::{
    events::{BytesStart, Event},
    name::LocalName,
    Reader,
};
use svcheck_core::{Diagnostics, NodeId, StageSamples, StateSample, SvError, SvResult};
use tracing::{debug, warn};

pub const SV_VOLTAGE: &str = "SvVoltage";
pub const FIELD_V: &str = "SvVoltage.v";
pub const FIELD_ANGLE: &str = "SvVoltage.angle";
pub const FIELD_NODE: &str = "SvVoltage.TopologicalNode";

/// Samples of one stage together with what was skipped while reading them.
#[derive(Debug, Clone, Default)]
pub struct StageLoad {
    pub samples: StageSamples,
    pub diagnostics: Diagnostics,
    /// `SvVoltage` records that carried no node reference
    pub unreferenced: usize,
}

impl StageLoad {
    fn absent(reason: String) -> Self {
        let mut load = Self::default();
        load.diagnostics.add_error("source", &reason);
        load
    }
}

#[derive(Default)]
struct PendingSvVoltage {
    node: Option<String>,
    v: Option<String>,
    angle: Option<String>,
}

#[derive(Clone, Copy)]
enum Field {
    V,
    Angle,
}

/// Load a stage snapshot from disk.
///
/// A missing, unreadable or empty file yields an empty stage. Only a
/// document that is not well-formed XML is reported as an error.
pub fn load_stage(path: &Path) -> SvResult<StageLoad> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("stage source '{}' unavailable: {err}", path.display());
            return Ok(StageLoad::absent(format!(
                "stage source '{}' unavailable: {err}",
                path.display()
            )));
        }
    };
    let text = String::from_utf8_lossy(&bytes);
    if text.trim().is_empty() {
        warn!("stage source '{}' is empty", path.display());
        return Ok(StageLoad::absent(format!(
            "stage source '{}' is empty",
            path.display()
        )));
    }
    let load = parse_voltages(&text)
        .map_err(|err| SvError::MalformedSnapshot(format!("{}: {err}", path.display())))?;
    debug!(
        "loaded {} sample(s) from '{}' ({} skipped)",
        load.samples.len(),
        path.display(),
        load.diagnostics.warning_count() + load.unreferenced
    );
    Ok(load)
}

/// Extract the voltages result set from an RDF/XML document.
pub fn parse_voltages(document: &str) -> SvResult<StageLoad> {
    let document = document.trim_start_matches('\u{feff}');
    let mut reader = Reader::from_str(document);
    reader.trim_text(true);

    let mut load = StageLoad::default();
    let mut records = 0usize;
    let mut current: Option<PendingSvVoltage> = None;
    let mut active: Option<Field> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.local_name();
                match local_name_as_str(&name) {
                    SV_VOLTAGE => current = Some(PendingSvVoltage::default()),
                    FIELD_V => active = Some(Field::V),
                    FIELD_ANGLE => active = Some(Field::Angle),
                    FIELD_NODE => {
                        if let Some(pending) = current.as_mut() {
                            pending.node = resource_id(e)?;
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.local_name();
                if local_name_as_str(&name) == FIELD_NODE {
                    if let Some(pending) = current.as_mut() {
                        pending.node = resource_id(e)?;
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let (Some(pending), Some(field)) = (current.as_mut(), active) {
                    let text = e.unescape().map_err(xml_error)?.trim().to_string();
                    match field {
                        Field::V => pending.v = Some(text),
                        Field::Angle => pending.angle = Some(text),
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.local_name();
                match local_name_as_str(&name) {
                    SV_VOLTAGE => {
                        if let Some(pending) = current.take() {
                            records += 1;
                            finish_record(pending, &mut load);
                        }
                    }
                    FIELD_V | FIELD_ANGLE => active = None,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(SvError::MalformedSnapshot(format!(
                    "error at position {}: {err}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }
    if records > 0 && load.unreferenced == records {
        return Err(SvError::MalformedSnapshot(format!(
            "none of {records} {SV_VOLTAGE} record(s) references a TopologicalNode"
        )));
    }
    Ok(load)
}

fn finish_record(pending: PendingSvVoltage, load: &mut StageLoad) {
    let Some(node) = pending.node.filter(|id| !id.is_empty()) else {
        load.unreferenced += 1;
        return;
    };
    let v = parse_number(pending.v.as_deref());
    let angle = parse_number(pending.angle.as_deref());
    match (v, angle) {
        (Some(v), Some(angle)) => {
            load.samples.push(NodeId::new(node), StateSample::new(v, angle))
        }
        _ => {
            let field = if v.is_none() { "v" } else { "angle" };
            load.diagnostics.add_warning_with_entity(
                "malformed",
                &format!("SvVoltage without a numeric {field}"),
                &node,
            );
        }
    }
}

fn parse_number(text: Option<&str>) -> Option<f64> {
    text?.parse::<f64>().ok().filter(|value| !value.is_nan())
}

/// Node id of an `rdf:resource` reference, fragment marker removed.
fn resource_id(event: &BytesStart) -> SvResult<Option<String>> {
    Ok(attribute_value(event, "resource")?
        .map(|resource| match resource.rsplit_once('#') {
            Some((_, fragment)) => fragment.to_string(),
            None => resource,
        }))
}

fn attribute_value(event: &BytesStart, key: &str) -> SvResult<Option<String>> {
    for attr in event.attributes().with_checks(false) {
        let attr = attr.map_err(|err| SvError::MalformedSnapshot(err.to_string()))?;
        if let Ok(name) = std::str::from_utf8(attr.key.local_name().as_ref()) {
            if name.eq_ignore_ascii_case(key) {
                return Ok(Some(attr.unescape_value().map_err(xml_error)?.into_owned()));
            }
        }
    }
    Ok(None)
}

fn local_name_as_str<'a>(name: &'a LocalName<'a>) -> &'a str {
    std::str::from_utf8(name.as_ref()).unwrap_or_default()
}

fn xml_error(err: quick_xml::Error) -> SvError {
    SvError::MalformedSnapshot(err.to_string())
}
