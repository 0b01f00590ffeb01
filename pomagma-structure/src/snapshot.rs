//! The on-disk snapshot format: a manifest plus one compressed, digested section per table (and
//! one for the carrier), all wrapped in a single `bincode` envelope.
//!
//! Each section is `bincode`-serialized, then compressed with `cloudflare-zlib`
//! (`pomagma_util::compression`), and its SHA-1 digest is taken over the *compressed* bytes. The
//! top-level digest is the SHA-1 of the sorted list of `(section_name, section_digest)` pairs, so
//! a snapshot's integrity can be checked without fully decoding any section.

use std::fs;
use std::path::Path;

use pomagma_carrier::Carrier;
use pomagma_dense_set::DenseSet;
use pomagma_tables::TableKind;
use pomagma_util::codec::{
    compress, compress2d, compress_pair_set, compress_set, decompress, decompress2d,
    decompress_pair_set, decompress_set, DeltaMap, DeltaMap2D, DeltaPairSet, DeltaSet,
};
use pomagma_util::{compression, Ob, PomagmaError, Result};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::signature::Signature;
use crate::structure::Structure;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CarrierSection {
    support_words: Vec<u64>,
    deps: DeltaMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum SectionBody {
    Carrier(CarrierSection),
    UnaryRelation(DeltaSet),
    BinaryRelation(DeltaPairSet),
    NullaryFunction(Ob),
    InjectiveFunction(DeltaMap),
    BinaryFunction(DeltaMap2D),
    SymmetricFunction(DeltaMap2D),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Section {
    name: String,
    digest: String,
    decompressed_len: usize,
    compressed: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Manifest {
    item_dim: u32,
    item_count: usize,
    digest: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Snapshot {
    manifest: Manifest,
    sections: Vec<Section>,
}

fn sha1_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn encode_section(name: &str, body: &SectionBody) -> Result<Section> {
    let plain = bincode::serialize(body)?;
    let compressed = compression::compress(&plain)?;
    let digest = sha1_hex(&compressed);
    Ok(Section {
        name: name.to_string(),
        digest,
        decompressed_len: plain.len(),
        compressed,
    })
}

fn decode_section(section: &Section) -> Result<SectionBody> {
    let found = sha1_hex(&section.compressed);
    if found != section.digest {
        return Err(PomagmaError::DigestMismatch {
            expected: section.digest.clone(),
            found,
        });
    }
    let plain = compression::decompress(&section.compressed, section.decompressed_len)?;
    Ok(bincode::deserialize(&plain)?)
}

fn top_level_digest(sections: &[Section]) -> String {
    let mut pairs: Vec<(&str, &str)> = sections
        .iter()
        .map(|s| (s.name.as_str(), s.digest.as_str()))
        .collect();
    pairs.sort_unstable();
    let plain = bincode::serialize(&pairs).expect("section digest list always serializes");
    sha1_hex(&plain)
}

pub fn dump(structure: &Structure, path: &Path) -> Result<()> {
    let sig = structure.signature();
    let carrier = sig.carrier();
    let item_dim = carrier.item_dim();

    let deps: Vec<(u32, u32)> = carrier
        .iter()
        .filter_map(|ob| {
            let rep = carrier.find(ob);
            (rep != ob).then_some((ob, rep))
        })
        .collect();
    let carrier_body = SectionBody::Carrier(CarrierSection {
        support_words: carrier.support().to_words(),
        deps: compress(&deps),
    });

    let mut sections = vec![encode_section("carrier", &carrier_body)?];

    for (name, table) in sig.unary_relations() {
        let keys: Vec<u32> = table.iter().collect();
        let body = SectionBody::UnaryRelation(compress_set(&keys));
        sections.push(encode_section(&qualified_name(TableKind::UnaryRelation, name), &body)?);
    }
    for (name, table) in sig.binary_relations() {
        let body = SectionBody::BinaryRelation(compress_pair_set(item_dim, &table.entries()));
        sections.push(encode_section(&qualified_name(TableKind::BinaryRelation, name), &body)?);
    }
    for (name, table) in sig.nullary_functions() {
        let body = SectionBody::NullaryFunction(table.find());
        sections.push(encode_section(&qualified_name(TableKind::NullaryFunction, name), &body)?);
    }
    for (name, table) in sig.injective_functions() {
        let body = SectionBody::InjectiveFunction(compress(&table.entries()));
        sections.push(encode_section(&qualified_name(TableKind::InjectiveFunction, name), &body)?);
    }
    for (name, table) in sig.binary_functions() {
        let body = SectionBody::BinaryFunction(compress2d(item_dim, &table.entries()));
        sections.push(encode_section(&qualified_name(TableKind::BinaryFunction, name), &body)?);
    }
    for (name, table) in sig.symmetric_functions() {
        let body = SectionBody::SymmetricFunction(compress2d(item_dim, &table.entries()));
        sections.push(encode_section(&qualified_name(TableKind::SymmetricFunction, name), &body)?);
    }

    let manifest = Manifest {
        item_dim,
        item_count: carrier.item_count(),
        digest: top_level_digest(&sections),
    };
    let snapshot = Snapshot { manifest, sections };
    let envelope = bincode::serialize(&snapshot)?;
    fs::write(path, envelope)?;
    Ok(())
}

fn qualified_name(kind: TableKind, name: &str) -> String {
    format!("{}:{}", kind.as_str(), name)
}

pub fn load(path: &Path) -> Result<Structure> {
    let envelope = fs::read(path)?;
    let snapshot: Snapshot = bincode::deserialize(&envelope)?;

    let found_digest = top_level_digest(&snapshot.sections);
    if found_digest != snapshot.manifest.digest {
        return Err(PomagmaError::DigestMismatch {
            expected: snapshot.manifest.digest,
            found: found_digest,
        });
    }

    let item_dim = snapshot.manifest.item_dim;
    let carrier_section = snapshot
        .sections
        .iter()
        .find(|s| s.name == "carrier")
        .ok_or_else(|| PomagmaError::UnknownTable("carrier".to_string()))?;
    let SectionBody::Carrier(carrier_body) = decode_section(carrier_section)? else {
        return Err(PomagmaError::Parse("carrier section has wrong body kind".to_string()));
    };
    let support = DenseSet::from_words(item_dim, carrier_body.support_words);
    let deps = decompress(&carrier_body.deps);
    let carrier = Carrier::from_parts(item_dim, support, &deps);

    let mut signature = Signature::with_carrier(std::sync::Arc::new(carrier));
    signature.seed_default_theory_negations();

    for section in &snapshot.sections {
        if section.name == "carrier" {
            continue;
        }
        let (kind_str, table_name) = section
            .name
            .split_once(':')
            .ok_or_else(|| PomagmaError::UnknownTable(section.name.clone()))?;
        match decode_section(section)? {
            SectionBody::UnaryRelation(set) => {
                debug_assert_eq!(kind_str, TableKind::UnaryRelation.as_str());
                let table = signature.declare_unary_relation(table_name);
                for ob in decompress_set(&set) {
                    table.raw_insert(ob);
                }
            }
            SectionBody::BinaryRelation(set) => {
                debug_assert_eq!(kind_str, TableKind::BinaryRelation.as_str());
                let table = signature.declare_binary_relation(table_name);
                for (lhs, rhs) in decompress_pair_set(item_dim, &set) {
                    table.raw_insert(lhs, rhs);
                }
            }
            SectionBody::NullaryFunction(val) => {
                debug_assert_eq!(kind_str, TableKind::NullaryFunction.as_str());
                let table = signature.declare_nullary_function(table_name);
                if val != 0 {
                    table.raw_insert(val);
                }
            }
            SectionBody::InjectiveFunction(map) => {
                debug_assert_eq!(kind_str, TableKind::InjectiveFunction.as_str());
                let table = signature.declare_injective_function(table_name);
                for (arg, val) in decompress(&map) {
                    table.raw_insert(arg, val);
                }
            }
            SectionBody::BinaryFunction(map) => {
                debug_assert_eq!(kind_str, TableKind::BinaryFunction.as_str());
                let table = signature.declare_binary_function(table_name);
                for (lhs, rhs, val) in decompress2d(item_dim, &map) {
                    table.raw_insert(lhs, rhs, val);
                }
            }
            SectionBody::SymmetricFunction(map) => {
                debug_assert_eq!(kind_str, TableKind::SymmetricFunction.as_str());
                let table = signature.declare_symmetric_function(table_name);
                for (lhs, rhs, val) in decompress2d(item_dim, &map) {
                    table.raw_insert(lhs, rhs, val);
                }
            }
            SectionBody::Carrier(_) => unreachable!("carrier section handled above"),
        }
    }

    Ok(Structure::with_signature(signature))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_then_load_round_trips_a_small_structure() {
        let mut structure = Structure::new(10);
        for _ in 0..6 {
            structure.carrier().unsafe_insert();
        }
        let rel = structure.signature_mut().declare_unary_relation("IS_ATOM");
        rel.insert(1);
        rel.insert(3);
        let app = structure.signature_mut().declare_binary_function("APP");
        app.insert(1, 2, 4);
        structure.carrier().merge(5, 4);
        app.unsafe_merge(5);
        app.update_values();

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("snapshot.pom");
        structure.dump(&path).expect("dump");

        let loaded = Structure::load(&path).expect("load");
        assert_eq!(loaded.carrier().item_dim(), 10);
        assert_eq!(loaded.carrier().item_count(), structure.carrier().item_count());
        let loaded_rel = loaded.signature().unary_relation("IS_ATOM").expect("IS_ATOM present");
        assert!(loaded_rel.find(1));
        assert!(loaded_rel.find(3));
        let loaded_app = loaded.signature().binary_function("APP").expect("APP present");
        assert_eq!(loaded_app.find(1, 2), loaded.carrier().find(4));
    }

    #[test]
    fn load_rejects_corrupted_digest() {
        let structure = Structure::new(5);
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("snapshot.pom");
        structure.dump(&path).expect("dump");

        let mut bytes = fs::read(&path).expect("read");
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(&path, &bytes).expect("write corrupted");

        assert!(Structure::load(&path).is_err());
    }
}
