//! FAQ document parser.
//!
//! Government FAQ dumps mix several question/answer notations in one file:
//! bold `**Q1: …**` markers, bare numbered lists, `Q:`/`A:` pairs, and
//! numbered questions whose answers sit under a `Jawapan :` label with
//! erratic tabs and blank lines. The parser runs an ordered list of
//! format rules (most specific first) over each `## ` section; a question
//! span claimed by an earlier rule is never re-emitted by a later one.
//!
//! Malformed fragments are skipped and logged, never fatal.

use regex::Regex;
use tanya_core::types::FaqRecord;

/// Bare numbered answers below this length are treated as noise
/// (list items, page furniture) and skipped.
const MIN_BARE_ANSWER_LEN: usize = 20;

/// Section-title keyword → agency label, checked in order.
/// More specific phrases come before their substrings
/// ("LESEN SENJATA API" before "SENJATA API").
const AGENCY_TAGS: &[(&str, &str)] = &[
    ("PUSPEN", "AADK"),
    ("NADA", "AADK"),
    ("PENGAMBILAN", "PDRM"),
    ("PASUKAN SUKARELAWAN POLIS", "PDRM"),
    ("TRAFIK", "PDRM"),
    ("LESEN SENJATA API", "PDRM"),
    ("APMM", "APMM"),
    ("PENDAFTARAN PERTUBUHAN", "ROS"),
    ("KAD PENGENALAN", "JPN"),
    ("KELAHIRAN", "JPN"),
    ("RELA", "RELA"),
    ("KESELAMATAN", "KDN"),
    ("PIROTEKNIK", "KDN"),
    ("SENJATA API", "KDN"),
    ("KAWALAN PENERBITAN", "KDN"),
    ("PENAPISAN FILEM", "KDN"),
    ("PENDAFTARAN NEGARA", "KDN"),
    ("AL-QURAN", "KDN"),
    ("IPCC", "KDN"),
];

/// A candidate pair emitted by one extraction rule. `span` is the byte
/// range of the question marker within the section body, used for
/// first-match-wins deduplication across rules.
struct RawPair {
    question: String,
    answer: String,
    span: (usize, usize),
}

struct Section<'a> {
    title: Option<&'a str>,
    body: &'a str,
}

/// Multi-format FAQ extractor. Build once, reuse across reloads.
pub struct DocumentParser {
    heading: Regex,
    bold_q: Regex,
    answer_label: Regex,
    labeled_q: Regex,
    labeled_a: Regex,
    numbered_q: Regex,
    jawapan_label: Regex,
    blank_runs: Regex,
}

impl DocumentParser {
    pub fn new() -> Self {
        Self {
            heading: Regex::new(r"(?m)^##[ \t]+(.+)$").expect("heading regex"),
            bold_q: Regex::new(r"\*\*Q\d+\s*:\s*([^*]+?)\*\*").expect("bold_q regex"),
            answer_label: Regex::new(r"^\s*A\s*:\s*").expect("answer_label regex"),
            labeled_q: Regex::new(r"(?m)^[ \t]*Q\s*:\s*([^\n]+)$").expect("labeled_q regex"),
            labeled_a: Regex::new(r"(?m)^[ \t]*A\s*:\s*").expect("labeled_a regex"),
            numbered_q: Regex::new(r"(?m)^[ \t]*\d+[.)]?[ \t]+([^\n]*\?[^\n]*?)[ \t]*$")
                .expect("numbered_q regex"),
            jawapan_label: Regex::new(r"(?mi)^[ \t]*jawapan[ \t]*:?[ \t]*").expect("jawapan regex"),
            blank_runs: Regex::new(r"\n[ \t]*\n([ \t]*\n)+").expect("blank_runs regex"),
        }
    }

    /// Parse the whole knowledge-base document into records, in document
    /// order. Record ids are assigned sequentially (parse order is the
    /// ranking tie-breaker downstream).
    pub fn parse(&self, text: &str) -> Vec<FaqRecord> {
        let mut records = Vec::new();

        for section in self.split_sections(text) {
            let tag = section
                .title
                .map(agency_tag)
                .unwrap_or_else(|| "unknown".to_string());

            // First-match-wins across rules: a question span claimed by an
            // earlier (more specific) rule is skipped by later rules.
            let mut claimed: Vec<(usize, usize)> = Vec::new();

            let rules: [(&str, fn(&Self, &str) -> Vec<RawPair>); 4] = [
                ("bold_q", Self::rule_bold_q),
                ("labeled_qa", Self::rule_labeled_qa),
                ("numbered_jawapan", Self::rule_numbered_jawapan),
                ("numbered_bare", Self::rule_numbered_bare),
            ];

            for (name, rule) in rules {
                for pair in rule(self, section.body) {
                    if claimed.iter().any(|c| overlaps(*c, pair.span)) {
                        continue;
                    }
                    if pair.question.is_empty() || pair.answer.is_empty() {
                        tracing::debug!("Parse skip ({name}): empty question or answer");
                        continue;
                    }
                    claimed.push(pair.span);
                    let mut record =
                        FaqRecord::new(pair.question, pair.answer, tag.clone());
                    record.id = records.len();
                    records.push(record);
                }
            }
        }

        tracing::info!("Parsed {} FAQ records", records.len());
        records
    }

    fn split_sections<'a>(&self, text: &'a str) -> Vec<Section<'a>> {
        let headings: Vec<(usize, usize, &str)> = self
            .heading
            .captures_iter(text)
            .filter_map(|c| {
                let full = c.get(0)?;
                let title = c.get(1)?.as_str().trim();
                Some((full.start(), full.end(), title))
            })
            .collect();

        let mut sections = Vec::new();
        let first_start = headings.first().map(|h| h.0).unwrap_or(text.len());
        if !text[..first_start].trim().is_empty() {
            sections.push(Section {
                title: None,
                body: &text[..first_start],
            });
        }
        for (i, &(_, end, title)) in headings.iter().enumerate() {
            let body_end = headings.get(i + 1).map(|h| h.0).unwrap_or(text.len());
            sections.push(Section {
                title: Some(title),
                body: &text[end..body_end],
            });
        }
        sections
    }

    /// Rule 1: `**Q1: question**` followed by an `A:` answer.
    fn rule_bold_q(&self, body: &str) -> Vec<RawPair> {
        let marks: Vec<_> = self.bold_q.captures_iter(body).collect();
        let mut pairs = Vec::new();
        for (i, caps) in marks.iter().enumerate() {
            let full = match caps.get(0) {
                Some(m) => m,
                None => continue,
            };
            let question = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            let region_end = marks
                .get(i + 1)
                .and_then(|c| c.get(0))
                .map(|m| m.start())
                .unwrap_or(body.len());
            let region = cut_at_rule(&body[full.end()..region_end]);

            let Some(label) = self.answer_label.find(region) else {
                tracing::debug!("Parse skip (bold_q): no A: label after {question:?}");
                continue;
            };
            pairs.push(RawPair {
                question: question.to_string(),
                answer: self.clean_answer(&region[label.end()..]),
                span: (full.start(), full.end()),
            });
        }
        pairs
    }

    /// Rule 2: `Q: question` / `A: answer` line pairs.
    fn rule_labeled_qa(&self, body: &str) -> Vec<RawPair> {
        let marks: Vec<_> = self.labeled_q.captures_iter(body).collect();
        let mut pairs = Vec::new();
        for (i, caps) in marks.iter().enumerate() {
            let full = match caps.get(0) {
                Some(m) => m,
                None => continue,
            };
            let question = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            let region_end = marks
                .get(i + 1)
                .and_then(|c| c.get(0))
                .map(|m| m.start())
                .unwrap_or(body.len());
            let region = cut_at_rule(&body[full.end()..region_end]);

            let Some(label) = self.labeled_a.find(region) else {
                tracing::debug!("Parse skip (labeled_qa): no A: line after {question:?}");
                continue;
            };
            pairs.push(RawPair {
                question: question.to_string(),
                answer: self.clean_answer(&region[label.end()..]),
                span: (full.start(), full.end()),
            });
        }
        pairs
    }

    /// Rule 3: numbered question with the answer under a `Jawapan :` label,
    /// tolerating tabs and runs of blank lines between the two.
    fn rule_numbered_jawapan(&self, body: &str) -> Vec<RawPair> {
        self.numbered_pairs(body, true)
    }

    /// Rule 4: bare numbered question with the answer following directly.
    /// The noisiest notation, so short answers are dropped.
    fn rule_numbered_bare(&self, body: &str) -> Vec<RawPair> {
        self.numbered_pairs(body, false)
    }

    fn numbered_pairs(&self, body: &str, require_label: bool) -> Vec<RawPair> {
        let marks: Vec<_> = self.numbered_q.captures_iter(body).collect();
        let mut pairs = Vec::new();
        for (i, caps) in marks.iter().enumerate() {
            let full = match caps.get(0) {
                Some(m) => m,
                None => continue,
            };
            let question = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            let region_end = marks
                .get(i + 1)
                .and_then(|c| c.get(0))
                .map(|m| m.start())
                .unwrap_or(body.len());
            let region = cut_at_rule(&body[full.end()..region_end]);

            let answer = if require_label {
                match self.jawapan_label.find(region) {
                    Some(label) => self.clean_answer(&region[label.end()..]),
                    None => continue,
                }
            } else {
                let answer = self.clean_answer(region);
                if answer.len() < MIN_BARE_ANSWER_LEN {
                    tracing::debug!(
                        "Parse skip (numbered_bare): answer too short for {question:?}"
                    );
                    continue;
                }
                answer
            };

            pairs.push(RawPair {
                question: question.to_string(),
                answer,
                span: (full.start(), full.end()),
            });
        }
        pairs
    }

    fn clean_answer(&self, raw: &str) -> String {
        self.blank_runs.replace_all(raw, "\n\n").trim().to_string()
    }
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Answers never run past a `---` horizontal rule.
fn cut_at_rule(region: &str) -> &str {
    match region.find("\n---") {
        Some(pos) => &region[..pos],
        None => region,
    }
}

fn overlaps(a: (usize, usize), b: (usize, usize)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

/// Map a section title onto its agency label, defaulting to "unknown".
fn agency_tag(title: &str) -> String {
    let upper = title.to_uppercase();
    for (needle, tag) in AGENCY_TAGS {
        if upper.contains(needle) {
            return (*tag).to_string();
        }
    }
    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXED_DOC: &str = r#"## SOALAN LAZIM KAD PENGENALAN

**Q1: Berapakah bayaran penggantian cip kad pengenalan yang rosak?**
A: Percuma dalam tempoh 1 tahun. RM10 dikenakan selepas 1 tahun dari tarikh penyerahan kad.

**Q2: Di manakah permohonan boleh dibuat?**
A: Di mana-mana pejabat JPN yang berhampiran dengan anda.

## PENGAMBILAN PDRM

Q: Apakah syarat minimum untuk memohon jawatan konstabel?
A: Warganegara Malaysia, berumur 18 hingga 28 tahun, dan sihat tubuh badan.

## PENCETAKAN AL-QURAN

1.	Apakah prosedur permohonan pencetakan teks Al-Quran?

	Jawapan :
	Permohonan hendaklah dikemukakan melalui Sistem UPQ dengan Borang A yang lengkap.

2.  Berapa lama tempoh kelulusan permohonan?


Jawapan:
Tempoh kelulusan adalah dalam masa 14 hari bekerja dari tarikh penerimaan dokumen lengkap.

## APMM

3. Bagaimanakah cara untuk menyertai APMM?
Permohonan dibuat melalui Suruhanjaya Perkhidmatan Awam menggunakan borang SPA8i.
"#;

    #[test]
    fn test_mixed_notations_all_extracted() {
        let parser = DocumentParser::new();
        let records = parser.parse(MIXED_DOC);
        assert_eq!(records.len(), 6);
        for r in &records {
            assert!(!r.question.is_empty());
            assert!(!r.answer.is_empty());
        }
    }

    #[test]
    fn test_parse_order_and_ids() {
        let parser = DocumentParser::new();
        let records = parser.parse(MIXED_DOC);
        for (i, r) in records.iter().enumerate() {
            assert_eq!(r.id, i);
        }
        assert!(records[0].question.contains("bayaran penggantian cip"));
    }

    #[test]
    fn test_agency_tags() {
        let parser = DocumentParser::new();
        let records = parser.parse(MIXED_DOC);
        assert_eq!(records[0].source_tag, "JPN");
        assert_eq!(records[2].source_tag, "PDRM");
        assert_eq!(records[3].source_tag, "KDN");
        assert_eq!(records[5].source_tag, "APMM");
    }

    #[test]
    fn test_no_double_count_between_numbered_rules() {
        // A labeled numbered pair matches both rule 3 and rule 4; the span
        // dedup must keep exactly one record.
        let doc = "## AL-QURAN\n\n1. Apakah prosedur permohonan?\n\nJawapan :\nPermohonan dibuat melalui Sistem UPQ dengan borang yang lengkap.\n";
        let parser = DocumentParser::new();
        let records = parser.parse(doc);
        assert_eq!(records.len(), 1);
        assert!(records[0].answer.starts_with("Permohonan dibuat"));
    }

    #[test]
    fn test_jawapan_answer_does_not_contain_label() {
        let parser = DocumentParser::new();
        let records = parser.parse(MIXED_DOC);
        let quran = &records[3];
        assert!(!quran.answer.to_lowercase().contains("jawapan"));
        assert!(quran.answer.contains("Sistem UPQ"));
    }

    #[test]
    fn test_malformed_fragments_skipped() {
        let doc = "## SEKSYEN\n\n**Q1: Soalan tanpa jawapan?**\n\nTiada label di sini.\n\n5. Senarai biasa tanpa tanda soal\nbutiran pendek\n";
        let parser = DocumentParser::new();
        let records = parser.parse(doc);
        assert!(records.is_empty());
    }

    #[test]
    fn test_short_bare_numbered_answer_skipped() {
        let doc = "## SEKSYEN\n\n1. Adakah ini soalan?\nYa.\n";
        let parser = DocumentParser::new();
        assert!(parser.parse(doc).is_empty());
    }

    #[test]
    fn test_answer_stops_at_horizontal_rule() {
        let doc = "## SEKSYEN\n\nQ: Apakah bayaran yang dikenakan?\nA: Bayaran adalah RM10 untuk setiap permohonan baharu.\n---\nNota kaki yang bukan jawapan.\n";
        let parser = DocumentParser::new();
        let records = parser.parse(doc);
        assert_eq!(records.len(), 1);
        assert!(!records[0].answer.contains("Nota kaki"));
    }

    #[test]
    fn test_unknown_tag_without_heading() {
        let doc = "Q: Apakah waktu operasi kaunter?\nA: Kaunter dibuka dari jam lapan pagi hingga lima petang.\n";
        let parser = DocumentParser::new();
        let records = parser.parse(doc);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source_tag, "unknown");
    }

    #[test]
    fn test_blank_run_collapse() {
        let doc = "## SEKSYEN\n\n1. Apakah prosedur lengkap?\n\nJawapan :\nLangkah pertama dibuat dahulu.\n\n\n\nLangkah kedua menyusul selepas itu.\n";
        let parser = DocumentParser::new();
        let records = parser.parse(doc);
        assert_eq!(records.len(), 1);
        assert!(records[0].answer.contains("pertama"));
        assert!(!records[0].answer.contains("\n\n\n"));
    }
}
