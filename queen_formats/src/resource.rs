use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Take, Write};
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, info};
use serde::Serialize;

use crate::error::{FormatError, Result};

pub const TABLE_TAG: [u8; 4] = *b"QTBL";
/// Newest companion table layout this reader understands.
pub const CURRENT_TBL_VERSION: u32 = 3;
pub const ENTRY_NAME_LEN: usize = 12;
pub const ENTRY_SIZE: usize = ENTRY_NAME_LEN + 1 + 4 + 4;
pub const RELEASE_ID_LEN: usize = 6;
const REBUILT_HEADER_SIZE: usize = 4 + RELEASE_ID_LEN + 2 + 1;

const MAIN_DATA_FILES: [&str; 2] = ["queen.1c", "queen.1"];
const TABLE_FILE: &str = "queen.tbl";
const SOUND_EXTENSIONS: [&str; 3] = [".SB", ".AMR", ".INS"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Platform {
    DosFloppy,
    DosCd,
    Amiga,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Language {
    English,
    French,
    German,
    Hebrew,
    Italian,
    Spanish,
    Greek,
    Russian,
}

/// Which release of the game a data set belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameVersion {
    pub id: String,
    pub platform: Platform,
    pub language: Language,
    pub is_demo: bool,
    pub is_interview: bool,
    pub rebuilt: bool,
    pub compression: u8,
}

impl GameVersion {
    pub fn from_id(id: &str) -> Result<Self> {
        let id = id.trim_end_matches('\0');
        let bytes = id.as_bytes();
        if bytes.len() < 5 {
            return Err(FormatError::Malformed(format!("release id '{id}' is too short")));
        }
        let platform = match bytes[0] {
            b'P' => Platform::DosFloppy,
            b'C' => Platform::DosCd,
            b'a' => Platform::Amiga,
            other => {
                return Err(FormatError::Malformed(format!(
                    "unknown platform code '{}' in release id '{id}'",
                    other as char
                )));
            }
        };
        let language = match bytes[1] {
            b'E' => Language::English,
            b'F' => Language::French,
            b'G' => Language::German,
            b'H' => Language::Hebrew,
            b'I' => Language::Italian,
            b'S' => Language::Spanish,
            b'g' => Language::Greek,
            b'R' => Language::Russian,
            other => {
                return Err(FormatError::Malformed(format!(
                    "unknown language code '{}' in release id '{id}'",
                    other as char
                )));
            }
        };
        let suffix = &id[2..];
        Ok(Self {
            id: id.to_string(),
            platform,
            language,
            is_demo: suffix == "100" || suffix == "101",
            is_interview: suffix == "int",
            rebuilt: false,
            compression: 0,
        })
    }

    pub fn is_talkie(&self) -> bool {
        self.platform == Platform::DosCd
    }

    pub fn is_floppy(&self) -> bool {
        self.platform != Platform::DosCd
    }

    /// The first five characters, as stored at the end of the script stream.
    pub fn check_id(&self) -> &str {
        let end = self.id.len().min(5);
        &self.id[..end]
    }
}

/// A shipped release identified by the size of its main data file.
#[derive(Debug, Clone, Copy)]
pub struct RetailRelease {
    pub id: &'static str,
    pub table_version: u32,
    pub table_offset: u32,
    pub data_size: u64,
}

/// Both 1.00 demos carry the id `PE100`; their data sizes tell them apart.
pub const RETAIL_RELEASES: &[RetailRelease] = &[
    RetailRelease { id: "PEM10", table_version: 1, table_offset: 0x0000_0008, data_size: 22_677_657 },
    RetailRelease { id: "CEM10", table_version: 1, table_offset: 0x0000_584E, data_size: 190_787_021 },
    RetailRelease { id: "PFM10", table_version: 1, table_offset: 0x0002_CD93, data_size: 22_157_304 },
    RetailRelease { id: "CFM10", table_version: 1, table_offset: 0x0003_2585, data_size: 186_689_095 },
    RetailRelease { id: "PGM10", table_version: 1, table_offset: 0x0005_9ACA, data_size: 22_240_013 },
    RetailRelease { id: "CGM10", table_version: 1, table_offset: 0x0005_F2A7, data_size: 217_648_975 },
    RetailRelease { id: "PIM10", table_version: 1, table_offset: 0x0008_66B1, data_size: 22_461_366 },
    RetailRelease { id: "CIM10", table_version: 1, table_offset: 0x0008_BEE2, data_size: 190_795_582 },
    RetailRelease { id: "CSM10", table_version: 1, table_offset: 0x000B_343C, data_size: 190_730_602 },
    RetailRelease { id: "CHM10", table_version: 1, table_offset: 0x000D_A981, data_size: 190_705_558 },
    RetailRelease { id: "PE100", table_version: 1, table_offset: 0x0010_1EC6, data_size: 3_724_538 },
    RetailRelease { id: "PEint", table_version: 1, table_offset: 0x0010_3838, data_size: 1_915_913 },
    RetailRelease { id: "aEM10", table_version: 2, table_offset: 0x0010_3F1E, data_size: 351_775 },
    RetailRelease { id: "CE101", table_version: 2, table_offset: 0x0010_7D8D, data_size: 563_335 },
    RetailRelease { id: "PE100", table_version: 2, table_offset: 0x0010_86D4, data_size: 597_032 },
    RetailRelease { id: "aGM10", table_version: 3, table_offset: 0x0010_8C6A, data_size: 344_575 },
];

pub fn find_retail_release(data_size: u64) -> Option<&'static RetailRelease> {
    RETAIL_RELEASES.iter().find(|release| release.data_size == data_size)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceEntry {
    pub name: String,
    pub bundle: u8,
    pub offset: u32,
    pub size: u32,
}

impl ResourceEntry {
    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        let mut raw = [0u8; ENTRY_NAME_LEN];
        reader.read_exact(&mut raw)?;
        let len = raw.iter().position(|&b| b == 0).unwrap_or(ENTRY_NAME_LEN);
        let name = String::from_utf8_lossy(&raw[..len]).to_ascii_uppercase();
        Ok(Self {
            name,
            bundle: reader.read_u8()?,
            offset: reader.read_u32::<BigEndian>()?,
            size: reader.read_u32::<BigEndian>()?,
        })
    }

    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        let mut raw = [0u8; ENTRY_NAME_LEN];
        let bytes = self.name.as_bytes();
        let len = bytes.len().min(ENTRY_NAME_LEN);
        raw[..len].copy_from_slice(&bytes[..len]);
        writer.write_all(&raw)?;
        writer.write_u8(self.bundle)?;
        writer.write_u32::<BigEndian>(self.offset)?;
        writer.write_u32::<BigEndian>(self.size)
    }
}

fn read_entries<R: Read + ?Sized>(reader: &mut R) -> io::Result<Vec<ResourceEntry>> {
    let count = reader.read_u16::<BigEndian>()? as usize;
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        entries.push(ResourceEntry::read_from(reader)?);
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Named blobs spread over one or more bundle files.
///
/// Only one bundle file is open at a time; reading an entry from another
/// bundle closes the current handle first.
#[derive(Debug)]
pub struct ResourceStore {
    root: PathBuf,
    main_file: PathBuf,
    version: GameVersion,
    entries: Vec<ResourceEntry>,
    open_bundle: Option<(u8, File)>,
}

impl ResourceStore {
    /// Opens the data set in `root`, reading the entry table either from a
    /// rebuilt main file or from the companion table (`table`, defaulting to
    /// `queen.tbl` next to the data).
    pub fn open(root: impl AsRef<Path>, table: Option<&Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let main_file = MAIN_DATA_FILES
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| FormatError::MissingBundle(root.join(MAIN_DATA_FILES[1])))?;

        let mut file = File::open(&main_file)?;
        let mut tag = [0u8; 4];
        let has_tag = file.read_exact(&mut tag).is_ok() && tag == TABLE_TAG;

        let (version, entries) = if has_tag {
            let mut id = [0u8; RELEASE_ID_LEN];
            file.read_exact(&mut id)?;
            let mut skipped = [0u8; 2];
            file.read_exact(&mut skipped)?;
            let compression = file.read_u8()?;
            let mut version = GameVersion::from_id(&String::from_utf8_lossy(&id))?;
            version.rebuilt = true;
            version.compression = compression;
            let entries = read_entries(&mut BufReader::new(&mut file))?;
            (version, entries)
        } else {
            let size = file.metadata()?.len();
            let release = find_retail_release(size).ok_or(FormatError::UnknownRelease { size })?;
            let version = GameVersion::from_id(release.id)?;
            let table_path = table
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.join(TABLE_FILE));
            let entries = read_table_file(&table_path, release)?;
            (version, entries)
        };

        info!(
            "opened {} ({} resources, release {})",
            main_file.display(),
            entries.len(),
            version.id
        );
        Ok(Self {
            root,
            main_file,
            version,
            entries,
            open_bundle: None,
        })
    }

    pub fn version(&self) -> &GameVersion {
        &self.version
    }

    pub fn entries(&self) -> &[ResourceEntry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&ResourceEntry> {
        let key = name.to_ascii_uppercase();
        self.entries
            .binary_search_by(|entry| entry.name.as_str().cmp(key.as_str()))
            .ok()
            .map(|index| &self.entries[index])
    }

    pub fn exists(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    pub fn load(&mut self, name: &str) -> Result<Vec<u8>> {
        let entry = self
            .entry(name)
            .cloned()
            .ok_or_else(|| FormatError::ResourceNotFound(name.to_string()))?;
        let file = self.seek_entry(&entry)?;
        let mut bytes = vec![0u8; entry.size as usize];
        file.read_exact(&mut bytes)?;
        debug!("loaded {} ({} bytes)", entry.name, entry.size);
        Ok(bytes)
    }

    /// Loads a text resource as Latin-1 lines.
    pub fn load_text(&mut self, name: &str) -> Result<Vec<String>> {
        let bytes = self.load(name)?;
        Ok(decode_text_lines(&bytes))
    }

    /// Positions a reader on a sound resource. Names without a sound
    /// extension, or absent from the table, yield `None`.
    pub fn find_sound(&mut self, name: &str) -> Result<Option<Take<&mut File>>> {
        let upper = name.to_ascii_uppercase();
        if !SOUND_EXTENSIONS.iter().any(|ext| upper.ends_with(ext)) {
            return Ok(None);
        }
        let Some(entry) = self.entry(&upper).cloned() else {
            return Ok(None);
        };
        let file = self.seek_entry(&entry)?;
        Ok(Some(file.take(u64::from(entry.size))))
    }

    fn bundle_path(&self, bundle: u8) -> PathBuf {
        if bundle <= 1 {
            self.main_file.clone()
        } else {
            self.root.join(format!("queen.{bundle}"))
        }
    }

    fn seek_entry(&mut self, entry: &ResourceEntry) -> Result<&mut File> {
        let reopen = !matches!(&self.open_bundle, Some((bundle, _)) if *bundle == entry.bundle);
        if reopen {
            // Drop the previous handle before opening the next bundle.
            self.open_bundle = None;
            let path = self.bundle_path(entry.bundle);
            let file = File::open(&path).map_err(|_| FormatError::MissingBundle(path.clone()))?;
            debug!("switched to bundle {}", path.display());
            self.open_bundle = Some((entry.bundle, file));
        }
        let (_, file) = self
            .open_bundle
            .as_mut()
            .ok_or_else(|| FormatError::Malformed("no bundle open".to_string()))?;
        file.seek(SeekFrom::Start(u64::from(entry.offset)))?;
        Ok(file)
    }
}

fn read_table_file(path: &Path, release: &RetailRelease) -> Result<Vec<ResourceEntry>> {
    let file = File::open(path).map_err(|_| FormatError::MissingBundle(path.to_path_buf()))?;
    let mut reader = BufReader::new(file);
    let mut tag = [0u8; 4];
    reader.read_exact(&mut tag)?;
    if tag != TABLE_TAG {
        return Err(FormatError::Malformed(format!(
            "{} is not a resource table",
            path.display()
        )));
    }
    let found = reader.read_u32::<BigEndian>()?;
    if found > CURRENT_TBL_VERSION {
        return Err(FormatError::FormatVersionMismatch {
            required: CURRENT_TBL_VERSION,
            found,
        });
    }
    if found < release.table_version {
        return Err(FormatError::FormatVersionMismatch {
            required: release.table_version,
            found,
        });
    }
    reader.seek(SeekFrom::Start(u64::from(release.table_offset)))?;
    Ok(read_entries(&mut reader)?)
}

pub fn decode_text_lines(bytes: &[u8]) -> Vec<String> {
    let text: String = bytes.iter().map(|&b| b as char).collect();
    let mut lines: Vec<String> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect();
    if lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines
}

/// Produces a self-describing bundle: `QTBL` header, entry table, then
/// payloads in name order.
#[derive(Debug, Clone)]
pub struct BundleWriter {
    release_id: String,
    compression: u8,
    files: Vec<(String, Vec<u8>)>,
}

impl BundleWriter {
    pub fn new(release_id: &str) -> Self {
        Self {
            release_id: release_id.to_string(),
            compression: 0,
            files: Vec::new(),
        }
    }

    pub fn with_compression(mut self, compression: u8) -> Self {
        self.compression = compression;
        self
    }

    pub fn add(&mut self, name: &str, bytes: Vec<u8>) -> &mut Self {
        let name = name.to_ascii_uppercase();
        self.files.retain(|(existing, _)| *existing != name);
        self.files.push((name, bytes));
        self
    }

    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let mut files: Vec<&(String, Vec<u8>)> = self.files.iter().collect();
        files.sort_by(|a, b| a.0.cmp(&b.0));

        let mut id = [0u8; RELEASE_ID_LEN];
        let raw = self.release_id.as_bytes();
        let len = raw.len().min(RELEASE_ID_LEN);
        id[..len].copy_from_slice(&raw[..len]);

        writer.write_all(&TABLE_TAG)?;
        writer.write_all(&id)?;
        writer.write_all(&[0, 0])?;
        writer.write_u8(self.compression)?;
        let count = u16::try_from(files.len())
            .map_err(|_| FormatError::Malformed("too many bundle entries".to_string()))?;
        writer.write_u16::<BigEndian>(count)?;

        let mut offset = (REBUILT_HEADER_SIZE + 2 + files.len() * ENTRY_SIZE) as u32;
        for (name, bytes) in &files {
            if name.len() > ENTRY_NAME_LEN {
                return Err(FormatError::Malformed(format!(
                    "resource name '{name}' exceeds {ENTRY_NAME_LEN} bytes"
                )));
            }
            let entry = ResourceEntry {
                name: name.clone(),
                bundle: 1,
                offset,
                size: bytes.len() as u32,
            };
            entry.write_to(writer)?;
            offset += entry.size;
        }
        for (_, bytes) in &files {
            writer.write_all(bytes)?;
        }
        Ok(())
    }

    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes)?;
        fs::write(path.as_ref(), bytes)?;
        Ok(())
    }
}
