//! Tier 1: curated answers for known high-stakes questions.
//!
//! Retrieval and synthesis are usually right, but cannot guarantee a fee
//! schedule to the ringgit. The handful of questions where a wrong figure
//! has real cost bypass retrieval entirely: a keyword signature over the
//! normalized query maps straight onto a vetted answer.

use std::collections::BTreeSet;

use tanya_core::types::{Answer, AnswerTier};

use crate::query::Query;

pub struct CuratedAnswer {
    pub key: &'static str,
    /// Signature terms counted against the normalized query text.
    pub signature: &'static [&'static str],
    /// How many signature terms must occur before this entry fires.
    pub min_hits: usize,
    pub answer: &'static str,
    pub source: &'static str,
}

pub const CURATED: &[CuratedAnswer] = &[
    CuratedAnswer {
        key: "ic_chip_cost",
        signature: &[
            "cip", "chip", "ic", "kad pengenalan", "mykad", "rosak", "bayar", "kos",
            "replacement", "replace", "cost", "fee", "damaged", "damage", "broken", "repair",
        ],
        min_hits: 3,
        answer: "Bayaran penggantian cip IC yang rosak:\n\n\
                 PERCUMA (RM0.00)\n\
                 • Kerosakan dalam tempoh 1 tahun dari tarikh penyerahan kad\n\
                 • Kerosakan bukan disebabkan kesengajaan atau salah guna\n\n\
                 RM10.00\n\
                 • Kerosakan selepas 1 tahun dari tarikh penyerahan kad\n\n\
                 Prosedur:\n\
                 1. Hadir ke pejabat JPN terdekat\n\
                 2. Bawa kad pengenalan dan dokumen sokongan\n\
                 3. Isi borang permohonan penggantian\n\
                 4. Jelaskan bayaran RM10.00 jika berkenaan\n\n\
                 Hubungi JPN:\n\
                 • Laman web: https://www.jpn.gov.my\n\
                 • Talian: 1-300-88-4444\n\n\
                 Sumber:\n\
                 • JPN",
        source: "JPN",
    },
    CuratedAnswer {
        key: "passport_requirements",
        signature: &["passport", "pasport", "syarat", "keperluan", "dokumen"],
        min_hits: 3,
        answer: "Syarat permohonan pasport Malaysia:\n\n\
                 Dokumen diperlukan:\n\
                 • Kad pengenalan asal dan salinan\n\
                 • Sijil kelahiran asal dan salinan\n\
                 • Borang permohonan pasport (IM.12)\n\
                 • Dua keping gambar berukuran pasport\n\n\
                 Bayaran:\n\
                 • Pasport 32 halaman: RM200\n\
                 • Pasport 64 halaman: RM300\n\n\
                 Tempat permohonan:\n\
                 • Pejabat Imigresen Malaysia\n\
                 • Pejabat JPN terpilih dan UTC\n\n\
                 Sumber:\n\
                 • JIM",
        source: "JIM",
    },
];

/// Exact/near-exact signature match against the normalized query.
pub fn lookup(query: &Query) -> Option<Answer> {
    for entry in CURATED {
        let hits = entry
            .signature
            .iter()
            .filter(|kw| query.normalized.contains(*kw))
            .count();
        if hits >= entry.min_hits {
            tracing::debug!("Curated answer '{}' matched ({} signature hits)", entry.key, hits);
            return Some(answer_from(entry));
        }
    }
    None
}

/// Look up a curated entry by key (used by the pattern tier's routes).
pub fn by_key(key: &str) -> Option<&'static CuratedAnswer> {
    CURATED.iter().find(|e| e.key == key)
}

pub fn answer_from(entry: &CuratedAnswer) -> Answer {
    let sources: BTreeSet<String> = [entry.source.to_string()].into();
    Answer::new(entry.answer, sources, AnswerTier::Hardcoded)
}
