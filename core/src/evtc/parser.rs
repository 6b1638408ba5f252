//! EVTC format parser.
//!
//! Decodes the fixed header, the agent table, the skill table, and the
//! combat-record table into a [`RawLog`]. Only structure is validated here:
//! bad magic, truncated tables, and unknown revisions fail, while semantic
//! oddities (unknown skill ids, impossible timestamps) pass through for the
//! processor to deal with.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use memchr::memchr;
use memmap2::Mmap;
use rayon::prelude::*;

use super::reader::ByteReader;
use super::raw::*;
use super::ParseError;
use crate::context::intern;


/// Parse an EVTC log from an in-memory byte buffer.
pub fn parse(bytes: &[u8]) -> Result<RawLog, ParseError> {
    let mut r = ByteReader::new(bytes);

    let (build, build_date, revision, trigger_id) = parse_header(&mut r)?;

    let agent_count = r.u32_le()? as usize;
    let mut agents = Vec::with_capacity(agent_count);
    for _ in 0..agent_count {
        agents.push(parse_agent(&mut r)?);
    }

    let skill_count = r.u32_le()? as usize;
    let mut skills = Vec::with_capacity(skill_count);
    for _ in 0..skill_count {
        skills.push(parse_skill(&mut r)?);
    }

    let record_bytes = r.bytes(r.remaining())?;
    let trailing = record_bytes.len() % RECORD_SIZE;
    if trailing != 0 {
        // A partially written final record; arcdps crashes mid-write leave these.
        tracing::debug!(trailing, "ignoring partial trailing combat record");
    }

    let records: Vec<RawRecord> = record_bytes
        .par_chunks_exact(RECORD_SIZE)
        .map(|chunk| decode_record(chunk, revision))
        .collect::<Result<_, _>>()?;

    Ok(RawLog {
        build,
        build_date,
        revision,
        trigger_id,
        agents,
        skills,
        records,
    })
}

/// Parse an EVTC log from a file on disk via memory map.
pub fn parse_file(path: impl AsRef<Path>) -> Result<RawLog, ParseError> {
    let path = path.as_ref();
    let file = fs::File::open(path).map_err(|source| ParseError::OpenFile {
        path: path.to_path_buf(),
        source,
    })?;
    let mmap = unsafe { Mmap::map(&file) }.map_err(|source| ParseError::MemoryMap {
        path: path.to_path_buf(),
        source,
    })?;
    parse(mmap.as_ref())
}

fn parse_header(
    r: &mut ByteReader<'_>,
) -> Result<(String, NaiveDate, Revision, u16), ParseError> {
    let magic = r.bytes(4)?;
    if magic != EVTC_MAGIC {
        return Err(ParseError::BadMagic);
    }

    let date_bytes = r.bytes(8)?;
    let date_str = String::from_utf8_lossy(date_bytes);
    let build_date = NaiveDate::parse_from_str(&date_str, "%Y%m%d").map_err(|_| {
        ParseError::BadBuildDate {
            build: format!("EVTC{date_str}"),
        }
    })?;
    let build = format!("EVTC{date_str}");

    let revision_byte = r.u8()?;
    let revision = Revision::from_byte(revision_byte).ok_or(ParseError::UnsupportedRevision {
        revision: revision_byte,
    })?;

    let trigger_id = r.u16_le()?;
    r.skip(1)?;

    Ok((build, build_date, revision, trigger_id))
}

fn parse_agent(r: &mut ByteReader<'_>) -> Result<RawAgent, ParseError> {
    let address = r.u64_le()?;
    let profession = r.u32_le()?;
    let elite = r.u32_le()?;
    let toughness = r.i16_le()?;
    let concentration = r.i16_le()?;
    let healing = r.i16_le()?;
    let hitbox_width = r.i16_le()?;
    let condition = r.i16_le()?;
    let hitbox_height = r.i16_le()?;
    let name = split_name_blob(r.bytes(AGENT_NAME_SIZE)?);

    // The elite field doubles as the variant sentinel: 0xFFFFFFFF means
    // non-player, and the profession's upper half then separates gadgets
    // from NPCs.
    let kind = if elite != 0xFFFF_FFFF {
        RawAgentKind::Player {
            profession,
            elite_spec: elite,
        }
    } else if profession & 0xFFFF_0000 == 0xFFFF_0000 {
        RawAgentKind::Gadget {
            gadget_id: profession & 0xFFFF,
        }
    } else {
        RawAgentKind::Npc {
            species_id: profession & 0xFFFF,
        }
    };

    Ok(RawAgent {
        address,
        kind,
        toughness,
        concentration,
        healing,
        condition,
        hitbox_width,
        hitbox_height,
        name,
    })
}

/// Split the packed 68-byte name blob on its NUL sentinels.
///
/// Players pack `character NUL account NUL subgroup NUL`; NPCs and gadgets
/// only fill the first part, and anonymized logs may blank any of them.
/// Missing parts come back as the empty string.
fn split_name_blob(blob: &[u8]) -> RawAgentName {
    let (character, rest) = take_nul_part(blob);
    let (account, rest) = take_nul_part(rest);
    let (subgroup, _) = take_nul_part(rest);

    RawAgentName {
        character: intern(&String::from_utf8_lossy(character)),
        account: intern(&String::from_utf8_lossy(account)),
        subgroup: intern(&String::from_utf8_lossy(subgroup)),
    }
}

fn take_nul_part(blob: &[u8]) -> (&[u8], &[u8]) {
    match memchr(0, blob) {
        Some(pos) => (&blob[..pos], &blob[pos + 1..]),
        None => (blob, &[]),
    }
}

fn parse_skill(r: &mut ByteReader<'_>) -> Result<RawSkill, ParseError> {
    let id = r.i32_le()?;
    let name_bytes = r.bytes(SKILL_SIZE - 4)?;
    let end = memchr(0, name_bytes).unwrap_or(name_bytes.len());
    let name = intern(&String::from_utf8_lossy(&name_bytes[..end]));
    Ok(RawSkill { id, name })
}

/// Decode one fixed-size combat record. The chunk length is guaranteed by
/// the caller's `chunks_exact`, so reads cannot fail in practice; errors
/// still propagate rather than panic.
fn decode_record(chunk: &[u8], revision: Revision) -> Result<RawRecord, ParseError> {
    let mut r = ByteReader::new(chunk);

    let time = r.i64_le()?;
    let src_agent = r.u64_le()?;
    let dst_agent = r.u64_le()?;
    let value = r.i32_le()?;
    let buff_dmg = r.i32_le()?;

    match revision {
        Revision::Current => {
            let overstack_value = r.u32_le()?;
            let skill_id = r.u32_le()?;
            let src_instid = r.u16_le()?;
            let dst_instid = r.u16_le()?;
            let src_master_instid = r.u16_le()?;
            let dst_master_instid = r.u16_le()?;
            let affinity = Affinity::from_byte(r.u8()?);
            let buff = r.u8()?;
            let result = r.u8()?;
            let activation = Activation::from_byte(r.u8()?);
            let buffremove = BuffRemoval::from_byte(r.u8()?);
            let is_ninety = r.u8()? != 0;
            let is_fifty = r.u8()? != 0;
            let is_moving = r.u8()? != 0;
            let statechange = StateChange::from_byte(r.u8()?);
            let is_flanking = r.u8()? != 0;
            let is_shields = r.u8()? != 0;
            let is_offcycle = r.u8()? != 0;

            Ok(RawRecord {
                time,
                src_agent,
                dst_agent,
                value,
                buff_dmg,
                overstack_value,
                skill_id,
                src_instid,
                dst_instid,
                src_master_instid,
                dst_master_instid,
                affinity,
                buff,
                result,
                activation,
                buffremove,
                is_ninety,
                is_fifty,
                is_moving,
                statechange,
                is_flanking,
                is_shields,
                is_offcycle,
            })
        }
        Revision::Legacy => {
            let overstack_value = r.u16_le()? as u32;
            let skill_id = r.u16_le()? as u32;
            let src_instid = r.u16_le()?;
            let dst_instid = r.u16_le()?;
            let src_master_instid = r.u16_le()?;
            r.skip(9)?;
            let affinity = Affinity::from_byte(r.u8()?);
            let buff = r.u8()?;
            let result = r.u8()?;
            let activation = Activation::from_byte(r.u8()?);
            let buffremove = BuffRemoval::from_byte(r.u8()?);
            let is_ninety = r.u8()? != 0;
            let is_fifty = r.u8()? != 0;
            let is_moving = r.u8()? != 0;
            let statechange = StateChange::from_byte(r.u8()?);
            let is_flanking = r.u8()? != 0;

            Ok(RawRecord {
                time,
                src_agent,
                dst_agent,
                value,
                buff_dmg,
                overstack_value,
                skill_id,
                src_instid,
                dst_instid,
                src_master_instid,
                dst_master_instid: 0,
                affinity,
                buff,
                result,
                activation,
                buffremove,
                is_ninety,
                is_fifty,
                is_moving,
                statechange,
                is_flanking,
                is_shields: false,
                is_offcycle: false,
            })
        }
    }
}
