//! QTI 2.1 item builder and content-package assembler.
//!
//! One question becomes one `assessmentItem` document; a package is the set
//! of item documents plus an `imsmanifest.xml`, deflated into one in-memory
//! zip. The response-processing tree written here is the exact outcome
//! wiring the target LMS needs to route modal feedback: null response,
//! exact-set match with score increment, else-branch reset, then one
//! condition per feedback identifier appending to FEEDBACKMODAL.

use std::io::{Cursor, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use quizport_core::grading::{choice_id, correct_choice_ids};
use quizport_core::ident::IdGenerator;
use quizport_core::model::Question;
use quizport_core::transform::{clean_general_text, clean_option_text, TextOptions};

use crate::error::FormatError;

const NS_QTI: &str = "http://www.imsglobal.org/xsd/imsqti_v2p1";
const NS_IMSCP: &str = "http://www.imsglobal.org/xsd/imscp_v1p1";
const NS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

const ITEM_SCHEMA_LOCATION: &str = "http://www.imsglobal.org/xsd/imsqti_v2p1 \
     http://www.imsglobal.org/xsd/qti/qtiv2p1/imsqti_v2p1p1.xsd";
const MANIFEST_SCHEMA_LOCATION: &str = "http://www.imsglobal.org/xsd/imscp_v1p1 \
     http://www.imsglobal.org/xsd/imscp_v1p1.xsd \
     http://www.imsglobal.org/xsd/imsqti_v2p1 \
     http://www.imsglobal.org/xsd/qti/qtiv2p1/imsqti_v2p1p1.xsd";

/// Configuration for the QTI export path.
#[derive(Debug, Clone)]
pub struct QtiConfig {
    /// Prefix for generated item titles (and the package filename).
    pub item_prefix: String,
    /// Strip leading "A) " style labels from option text.
    pub strip_prefixes: bool,
    /// Rewrite `$...$` inline math to `$$...$$`.
    pub convert_math: bool,
    /// Let the LMS shuffle choice order at delivery time.
    pub shuffle: bool,
}

impl Default for QtiConfig {
    fn default() -> Self {
        Self {
            item_prefix: "Item".to_string(),
            strip_prefixes: true,
            convert_math: true,
            shuffle: true,
        }
    }
}

/// One fully-resolved assessment item, ready to serialize.
///
/// Built once per question by [`QtiItem::from_question`]; all identifier
/// generation happens there so serialization is repeatable.
#[derive(Debug, Clone)]
pub struct QtiItem {
    /// Item identifier, also the file stem inside the package.
    pub id: String,
    pub title: String,
    pub stem: String,
    /// `(choice identifier, display text)` in option order.
    pub choices: Vec<(String, String)>,
    /// Identifiers of the correct choices, in option order.
    pub correct_ids: Vec<String>,
    pub success_id: String,
    pub error_id: String,
    pub success_text: String,
    pub error_text: String,
    pub shuffle: bool,
}

impl QtiItem {
    /// Resolve one question into an item. `index` is 1-based and feeds the
    /// generated title.
    pub fn from_question(
        index: usize,
        question: &Question,
        config: &QtiConfig,
        ids: &mut dyn IdGenerator,
    ) -> Result<Self, FormatError> {
        question.validate(index)?;

        let text_opts = TextOptions {
            strip_prefixes: config.strip_prefixes,
            convert_math: config.convert_math,
        };

        let choices = question
            .options
            .iter()
            .enumerate()
            .map(|(i, c)| (choice_id(i), clean_option_text(&c.text, text_opts)))
            .collect();

        Ok(QtiItem {
            id: ids.item_id(),
            title: format!("{}_{:02}", config.item_prefix, index),
            stem: clean_general_text(&question.prompt, config.convert_math),
            choices,
            correct_ids: correct_choice_ids(&question.options),
            success_id: ids.feedback_id(),
            error_id: ids.feedback_id(),
            success_text: clean_general_text(&question.success_feedback, config.convert_math),
            error_text: clean_general_text(&question.error_feedback, config.convert_math),
            shuffle: config.shuffle,
        })
    }

    /// Name of this item's file inside the package.
    pub fn filename(&self) -> String {
        format!("{}.xml", self.id)
    }

    /// Serialize the full `assessmentItem` document.
    pub fn to_xml(&self) -> Result<Vec<u8>, FormatError> {
        let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
        w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new("assessmentItem");
        root.push_attribute(("xmlns", NS_QTI));
        root.push_attribute(("xmlns:xsi", NS_XSI));
        root.push_attribute(("xsi:schemaLocation", ITEM_SCHEMA_LOCATION));
        root.push_attribute(("identifier", self.id.as_str()));
        root.push_attribute(("title", self.title.as_str()));
        root.push_attribute(("adaptive", "false"));
        root.push_attribute(("timeDependent", "false"));
        w.write_event(Event::Start(root))?;

        self.write_response_declaration(&mut w)?;
        self.write_outcome_declarations(&mut w)?;
        self.write_item_body(&mut w)?;
        self.write_modal_feedback(&mut w)?;
        self.write_response_processing(&mut w)?;

        w.write_event(Event::End(BytesEnd::new("assessmentItem")))?;
        Ok(w.into_inner())
    }

    fn write_response_declaration(&self, w: &mut Writer<Vec<u8>>) -> Result<(), FormatError> {
        let mut rd = BytesStart::new("responseDeclaration");
        rd.push_attribute(("identifier", "RESPONSE_1"));
        rd.push_attribute(("cardinality", "multiple"));
        rd.push_attribute(("baseType", "identifier"));
        w.write_event(Event::Start(rd))?;

        w.write_event(Event::Start(BytesStart::new("correctResponse")))?;
        for id in &self.correct_ids {
            write_text_elem(w, "value", id)?;
        }
        w.write_event(Event::End(BytesEnd::new("correctResponse")))?;

        w.write_event(Event::End(BytesEnd::new("responseDeclaration")))?;
        Ok(())
    }

    fn write_outcome_declarations(&self, w: &mut Writer<Vec<u8>>) -> Result<(), FormatError> {
        for (ident, base_type, default) in [
            ("SCORE", "float", "0"),
            ("MAXSCORE", "float", "1"),
            ("MINSCORE", "float", "0"),
            ("FEEDBACKBASIC", "identifier", "empty"),
        ] {
            let mut od = BytesStart::new("outcomeDeclaration");
            od.push_attribute(("identifier", ident));
            od.push_attribute(("cardinality", "single"));
            od.push_attribute(("baseType", base_type));
            w.write_event(Event::Start(od))?;

            w.write_event(Event::Start(BytesStart::new("defaultValue")))?;
            write_text_elem(w, "value", default)?;
            w.write_event(Event::End(BytesEnd::new("defaultValue")))?;

            w.write_event(Event::End(BytesEnd::new("outcomeDeclaration")))?;
        }

        // FEEDBACKMODAL collects the feedback identifiers to show.
        let mut modal = BytesStart::new("outcomeDeclaration");
        modal.push_attribute(("identifier", "FEEDBACKMODAL"));
        modal.push_attribute(("cardinality", "multiple"));
        modal.push_attribute(("baseType", "identifier"));
        modal.push_attribute(("view", "testConstructor"));
        w.write_event(Event::Empty(modal))?;
        Ok(())
    }

    fn write_item_body(&self, w: &mut Writer<Vec<u8>>) -> Result<(), FormatError> {
        w.write_event(Event::Start(BytesStart::new("itemBody")))?;
        write_text_elem(w, "p", &self.stem)?;

        let mut ci = BytesStart::new("choiceInteraction");
        ci.push_attribute(("responseIdentifier", "RESPONSE_1"));
        ci.push_attribute(("shuffle", bool_str(self.shuffle)));
        ci.push_attribute(("maxChoices", "0"));
        w.write_event(Event::Start(ci))?;

        for (id, text) in &self.choices {
            let mut sc = BytesStart::new("simpleChoice");
            sc.push_attribute(("identifier", id.as_str()));
            w.write_event(Event::Start(sc))?;
            write_text_elem(w, "p", text)?;
            w.write_event(Event::End(BytesEnd::new("simpleChoice")))?;
        }

        w.write_event(Event::End(BytesEnd::new("choiceInteraction")))?;
        w.write_event(Event::End(BytesEnd::new("itemBody")))?;
        Ok(())
    }

    fn write_modal_feedback(&self, w: &mut Writer<Vec<u8>>) -> Result<(), FormatError> {
        for (id, text) in [
            (&self.success_id, &self.success_text),
            (&self.error_id, &self.error_text),
        ] {
            let mut mf = BytesStart::new("modalFeedback");
            mf.push_attribute(("identifier", id.as_str()));
            mf.push_attribute(("outcomeIdentifier", "FEEDBACKMODAL"));
            mf.push_attribute(("showHide", "show"));
            w.write_event(Event::Start(mf))?;
            write_text_elem(w, "p", text)?;
            w.write_event(Event::End(BytesEnd::new("modalFeedback")))?;
        }
        Ok(())
    }

    fn write_response_processing(&self, w: &mut Writer<Vec<u8>>) -> Result<(), FormatError> {
        w.write_event(Event::Start(BytesStart::new("responseProcessing")))?;

        // 1) No answer given -> FEEDBACKBASIC = empty.
        w.write_event(Event::Start(BytesStart::new("responseCondition")))?;
        w.write_event(Event::Start(BytesStart::new("responseIf")))?;
        w.write_event(Event::Start(BytesStart::new("isNull")))?;
        write_variable(w, "RESPONSE_1")?;
        w.write_event(Event::End(BytesEnd::new("isNull")))?;
        write_set_outcome_base(w, "FEEDBACKBASIC", "identifier", "empty")?;
        w.write_event(Event::End(BytesEnd::new("responseIf")))?;
        w.write_event(Event::End(BytesEnd::new("responseCondition")))?;

        // 2) Exact-set match -> SCORE += MAXSCORE, FEEDBACKBASIC = correct;
        // 3) else -> SCORE = 0, FEEDBACKBASIC = incorrect.
        w.write_event(Event::Start(BytesStart::new("responseCondition")))?;
        w.write_event(Event::Start(BytesStart::new("responseIf")))?;
        w.write_event(Event::Start(BytesStart::new("match")))?;
        write_variable(w, "RESPONSE_1")?;
        let mut correct = BytesStart::new("correct");
        correct.push_attribute(("identifier", "RESPONSE_1"));
        w.write_event(Event::Empty(correct))?;
        w.write_event(Event::End(BytesEnd::new("match")))?;

        let mut so = BytesStart::new("setOutcomeValue");
        so.push_attribute(("identifier", "SCORE"));
        w.write_event(Event::Start(so))?;
        w.write_event(Event::Start(BytesStart::new("sum")))?;
        write_variable(w, "SCORE")?;
        write_variable(w, "MAXSCORE")?;
        w.write_event(Event::End(BytesEnd::new("sum")))?;
        w.write_event(Event::End(BytesEnd::new("setOutcomeValue")))?;
        write_set_outcome_base(w, "FEEDBACKBASIC", "identifier", "correct")?;
        w.write_event(Event::End(BytesEnd::new("responseIf")))?;

        w.write_event(Event::Start(BytesStart::new("responseElse")))?;
        write_set_outcome_base(w, "SCORE", "float", "0")?;
        write_set_outcome_base(w, "FEEDBACKBASIC", "identifier", "incorrect")?;
        w.write_event(Event::End(BytesEnd::new("responseElse")))?;
        w.write_event(Event::End(BytesEnd::new("responseCondition")))?;

        // 4) and 5) route the matching feedback identifier into FEEDBACKMODAL.
        self.write_modal_append(w, "correct", &self.success_id)?;
        self.write_modal_append(w, "incorrect", &self.error_id)?;

        w.write_event(Event::End(BytesEnd::new("responseProcessing")))?;
        Ok(())
    }

    fn write_modal_append(
        &self,
        w: &mut Writer<Vec<u8>>,
        basic_value: &str,
        feedback_id: &str,
    ) -> Result<(), FormatError> {
        w.write_event(Event::Start(BytesStart::new("responseCondition")))?;
        w.write_event(Event::Start(BytesStart::new("responseIf")))?;

        w.write_event(Event::Start(BytesStart::new("match")))?;
        write_base_value(w, "identifier", basic_value)?;
        write_variable(w, "FEEDBACKBASIC")?;
        w.write_event(Event::End(BytesEnd::new("match")))?;

        let mut so = BytesStart::new("setOutcomeValue");
        so.push_attribute(("identifier", "FEEDBACKMODAL"));
        w.write_event(Event::Start(so))?;
        w.write_event(Event::Start(BytesStart::new("multiple")))?;
        write_variable(w, "FEEDBACKMODAL")?;
        write_base_value(w, "identifier", feedback_id)?;
        w.write_event(Event::End(BytesEnd::new("multiple")))?;
        w.write_event(Event::End(BytesEnd::new("setOutcomeValue")))?;

        w.write_event(Event::End(BytesEnd::new("responseIf")))?;
        w.write_event(Event::End(BytesEnd::new("responseCondition")))?;
        Ok(())
    }
}

/// Build the `imsmanifest.xml` document for the given item filenames.
///
/// Resource identifiers are derived from the filenames so the manifest and
/// the zip entries can never drift apart.
pub fn manifest_xml(item_filenames: &[String]) -> Result<Vec<u8>, FormatError> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("manifest");
    root.push_attribute(("xmlns", NS_IMSCP));
    root.push_attribute(("xmlns:xsi", NS_XSI));
    root.push_attribute(("xsi:schemaLocation", MANIFEST_SCHEMA_LOCATION));
    root.push_attribute(("identifier", "manifestID"));
    w.write_event(Event::Start(root))?;

    w.write_event(Event::Start(BytesStart::new("metadata")))?;
    write_text_elem(&mut w, "schema", "QTIv2.1 Package")?;
    write_text_elem(&mut w, "schemaversion", "1.0.0")?;
    w.write_event(Event::End(BytesEnd::new("metadata")))?;

    w.write_event(Event::Empty(BytesStart::new("organizations")))?;

    w.write_event(Event::Start(BytesStart::new("resources")))?;
    for filename in item_filenames {
        let rid = resource_id(filename);
        let mut res = BytesStart::new("resource");
        res.push_attribute(("identifier", rid.as_str()));
        res.push_attribute(("type", "imsqti_item_xmlv2p1"));
        res.push_attribute(("href", filename.as_str()));
        w.write_event(Event::Start(res))?;

        let mut file = BytesStart::new("file");
        file.push_attribute(("href", filename.as_str()));
        w.write_event(Event::Empty(file))?;

        w.write_event(Event::End(BytesEnd::new("resource")))?;
    }
    w.write_event(Event::End(BytesEnd::new("resources")))?;

    w.write_event(Event::End(BytesEnd::new("manifest")))?;
    Ok(w.into_inner())
}

/// Manifest resource identifier for an item filename.
fn resource_id(filename: &str) -> String {
    let stem = filename.strip_suffix(".xml").unwrap_or(filename);
    format!("res_{}", stem.replace('-', "_"))
}

/// Build the complete QTI package: one XML file per question plus the
/// manifest, deflated into an in-memory zip.
pub fn build_package(
    questions: &[Question],
    config: &QtiConfig,
    ids: &mut dyn IdGenerator,
) -> Result<Vec<u8>, FormatError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let entry_opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut item_filenames = Vec::with_capacity(questions.len());

    for (i, question) in questions.iter().enumerate() {
        let item = QtiItem::from_question(i + 1, question, config, ids)?;
        let filename = item.filename();

        zip.start_file(filename.as_str(), entry_opts)?;
        zip.write_all(&item.to_xml()?)?;
        item_filenames.push(filename);
    }

    zip.start_file("imsmanifest.xml", entry_opts)?;
    zip.write_all(&manifest_xml(&item_filenames)?)?;

    Ok(zip.finish()?.into_inner())
}

fn bool_str(v: bool) -> &'static str {
    if v {
        "true"
    } else {
        "false"
    }
}

fn write_text_elem(w: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), FormatError> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_variable(w: &mut Writer<Vec<u8>>, identifier: &str) -> Result<(), FormatError> {
    let mut var = BytesStart::new("variable");
    var.push_attribute(("identifier", identifier));
    w.write_event(Event::Empty(var))?;
    Ok(())
}

fn write_base_value(
    w: &mut Writer<Vec<u8>>,
    base_type: &str,
    value: &str,
) -> Result<(), FormatError> {
    let mut bv = BytesStart::new("baseValue");
    bv.push_attribute(("baseType", base_type));
    w.write_event(Event::Start(bv))?;
    w.write_event(Event::Text(BytesText::new(value)))?;
    w.write_event(Event::End(BytesEnd::new("baseValue")))?;
    Ok(())
}

fn write_set_outcome_base(
    w: &mut Writer<Vec<u8>>,
    outcome: &str,
    base_type: &str,
    value: &str,
) -> Result<(), FormatError> {
    let mut so = BytesStart::new("setOutcomeValue");
    so.push_attribute(("identifier", outcome));
    w.write_event(Event::Start(so))?;
    write_base_value(w, base_type, value)?;
    w.write_event(Event::End(BytesEnd::new("setOutcomeValue")))?;
    Ok(())
}
