//! SQLite implementation of [`DictionaryStore`].
//!
//! [`SqliteStore`] persists dictionaries in a SQLite database with WAL mode,
//! transactions around every multi-row write, and automatic schema
//! migrations. Lists, sets and extras are stored as JSON TEXT columns via
//! serde_json.

use std::rc::Rc;

use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use ocl_core::{
    AccessLevel, ConceptId, ConceptVersion, Extras, Mapping, MappingId, OwnerRef, OwnerType,
    Source, SourceId, SourceVersion, VersionId,
};

use crate::error::StorageError;
use crate::query::ChildFilter;
use crate::traits::DictionaryStore;

const SOURCE_COLUMNS: &str = "id, mnemonic, name, full_name, source_type, public_access, \
     default_locale, supported_locales_json, website, description, external_id, extras_json, \
     owner, owner_type, is_active, created_at, updated_at";

const VERSION_COLUMNS: &str = "id, source_id, mnemonic, released, description, external_id, \
     extras_json, is_active, previous_version, parent_version, concepts_json, mappings_json, \
     created_at, updated_at";

/// Raw source row; JSON and enum columns are decoded after the row closure
/// returns so their errors surface as [`StorageError`].
struct SourceRow {
    source: Source,
    public_access: String,
    owner_type: String,
    supported_locales_json: String,
    extras_json: String,
}

struct VersionRow {
    version: SourceVersion,
    extras_json: String,
    concepts_json: String,
    mappings_json: String,
}

/// SQLite-backed implementation of [`DictionaryStore`].
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) a SQLite database at `path`.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(path)?;
        Ok(SqliteStore { conn })
    }

    /// Opens an in-memory SQLite database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteStore { conn })
    }

    // -----------------------------------------------------------------------
    // Row decoding
    // -----------------------------------------------------------------------

    fn read_source_row(row: &Row<'_>) -> rusqlite::Result<SourceRow> {
        Ok(SourceRow {
            source: Source {
                id: SourceId(row.get(0)?),
                mnemonic: row.get(1)?,
                name: row.get(2)?,
                full_name: row.get(3)?,
                source_type: row.get(4)?,
                public_access: AccessLevel::default(),
                default_locale: row.get(6)?,
                supported_locales: Vec::new(),
                website: row.get(8)?,
                description: row.get(9)?,
                external_id: row.get(10)?,
                extras: Extras::new(),
                owner: row.get(12)?,
                owner_type: OwnerType::User,
                is_active: row.get(14)?,
                created_at: row.get(15)?,
                updated_at: row.get(16)?,
            },
            public_access: row.get(5)?,
            supported_locales_json: row.get(7)?,
            extras_json: row.get(11)?,
            owner_type: row.get(13)?,
        })
    }

    fn decode_source(raw: SourceRow) -> Result<Source, StorageError> {
        let mut source = raw.source;
        source.public_access = raw.public_access.parse()?;
        source.owner_type = raw.owner_type.parse()?;
        source.supported_locales = serde_json::from_str(&raw.supported_locales_json)?;
        source.extras = serde_json::from_str(&raw.extras_json)?;
        Ok(source)
    }

    fn read_version_row(row: &Row<'_>) -> rusqlite::Result<VersionRow> {
        Ok(VersionRow {
            version: SourceVersion {
                id: VersionId(row.get(0)?),
                source: SourceId(row.get(1)?),
                mnemonic: row.get(2)?,
                released: row.get(3)?,
                description: row.get(4)?,
                external_id: row.get(5)?,
                extras: Extras::new(),
                is_active: row.get(7)?,
                previous_version: row.get(8)?,
                parent_version: row.get(9)?,
                concepts: Vec::new(),
                mappings: Vec::new(),
                created_at: row.get(12)?,
                updated_at: row.get(13)?,
            },
            extras_json: row.get(6)?,
            concepts_json: row.get(10)?,
            mappings_json: row.get(11)?,
        })
    }

    fn decode_version(raw: VersionRow) -> Result<SourceVersion, StorageError> {
        let mut version = raw.version;
        version.extras = serde_json::from_str(&raw.extras_json)?;
        version.concepts = serde_json::from_str(&raw.concepts_json)?;
        version.mappings = serde_json::from_str(&raw.mappings_json)?;
        Ok(version)
    }

    fn query_sources(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Source>, StorageError> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let rows = stmt.query_map(params, Self::read_source_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(Self::decode_source(row?)?);
        }
        Ok(result)
    }

    fn query_versions(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<SourceVersion>, StorageError> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let rows = stmt.query_map(params, Self::read_version_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(Self::decode_version(row?)?);
        }
        Ok(result)
    }

    // -----------------------------------------------------------------------
    // Transactional helpers
    // -----------------------------------------------------------------------

    fn active_version_exists(
        tx: &Transaction<'_>,
        source: SourceId,
        mnemonic: &str,
        except: VersionId,
    ) -> Result<bool, StorageError> {
        Ok(tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM source_versions \
             WHERE source_id = ?1 AND mnemonic = ?2 AND is_active = 1 AND id != ?3)",
            params![source.0, mnemonic, except.0],
            |row| row.get(0),
        )?)
    }

    /// Inserts a version row and enforces release exclusivity.
    fn insert_version(
        tx: &Transaction<'_>,
        version: &SourceVersion,
    ) -> Result<SourceVersion, StorageError> {
        tx.execute(
            "INSERT INTO source_versions (source_id, mnemonic, released, description, \
             external_id, extras_json, is_active, previous_version, parent_version, \
             concepts_json, mappings_json, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                version.source.0,
                version.mnemonic,
                version.released,
                version.description,
                version.external_id,
                serde_json::to_string(&version.extras)?,
                version.is_active,
                version.previous_version,
                version.parent_version,
                serde_json::to_string(&version.concepts)?,
                serde_json::to_string(&version.mappings)?,
                version.created_at,
                version.updated_at,
            ],
        )?;
        let mut stored = version.clone();
        stored.id = VersionId(tx.last_insert_rowid());
        if stored.released && stored.is_active {
            Self::unrelease_siblings(tx, stored.source, stored.id)?;
        }
        Ok(stored)
    }

    fn unrelease_siblings(
        tx: &Transaction<'_>,
        source: SourceId,
        keep: VersionId,
    ) -> Result<(), StorageError> {
        tx.execute(
            "UPDATE source_versions SET released = 0 WHERE source_id = ?1 AND id != ?2",
            params![source.0, keep.0],
        )?;
        Ok(())
    }

    fn id_array<I>(ids: &[I], raw: impl Fn(&I) -> i64) -> Rc<Vec<Value>> {
        Rc::new(ids.iter().map(|id| Value::Integer(raw(id))).collect())
    }

    fn limit_clause(limit: Option<usize>) -> i64 {
        limit.map_or(-1, |l| l as i64)
    }
}

impl DictionaryStore for SqliteStore {
    fn create_source(
        &mut self,
        source: &Source,
        initial_version: &SourceVersion,
    ) -> Result<(Source, SourceVersion), StorageError> {
        let tx = self.conn.transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM sources \
             WHERE owner_type = ?1 AND owner = ?2 AND mnemonic = ?3 AND is_active = 1)",
            params![source.owner_type.as_str(), source.owner, source.mnemonic],
            |row| row.get(0),
        )?;
        if exists {
            return Err(StorageError::DuplicateSource {
                owner: source.owner_ref().url(),
                mnemonic: source.mnemonic.clone(),
            });
        }

        tx.execute(
            "INSERT INTO sources (mnemonic, name, full_name, source_type, public_access, \
             default_locale, supported_locales_json, website, description, external_id, \
             extras_json, owner, owner_type, is_active, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                source.mnemonic,
                source.name,
                source.full_name,
                source.source_type,
                source.public_access.as_str(),
                source.default_locale,
                serde_json::to_string(&source.supported_locales)?,
                source.website,
                source.description,
                source.external_id,
                serde_json::to_string(&source.extras)?,
                source.owner,
                source.owner_type.as_str(),
                source.is_active,
                source.created_at,
                source.updated_at,
            ],
        )?;
        let mut stored = source.clone();
        stored.id = SourceId(tx.last_insert_rowid());

        let mut version = initial_version.clone();
        version.source = stored.id;
        let version = Self::insert_version(&tx, &version)?;

        tx.commit()?;
        Ok((stored, version))
    }

    fn get_source(
        &self,
        owner: &OwnerRef,
        mnemonic: &str,
    ) -> Result<Option<Source>, StorageError> {
        let sql = format!(
            "SELECT {SOURCE_COLUMNS} FROM sources \
             WHERE owner_type = ?1 AND owner = ?2 AND mnemonic = ?3 AND is_active = 1"
        );
        let raw = self
            .conn
            .query_row(
                &sql,
                params![owner.owner_type.as_str(), owner.name, mnemonic],
                Self::read_source_row,
            )
            .optional()?;
        raw.map(Self::decode_source).transpose()
    }

    fn update_source(&mut self, source: &Source) -> Result<(), StorageError> {
        let changed = self.conn.execute(
            "UPDATE sources SET mnemonic = ?2, name = ?3, full_name = ?4, source_type = ?5, \
             public_access = ?6, default_locale = ?7, supported_locales_json = ?8, website = ?9, \
             description = ?10, external_id = ?11, extras_json = ?12, is_active = ?13, \
             updated_at = ?14 WHERE id = ?1",
            params![
                source.id.0,
                source.mnemonic,
                source.name,
                source.full_name,
                source.source_type,
                source.public_access.as_str(),
                source.default_locale,
                serde_json::to_string(&source.supported_locales)?,
                source.website,
                source.description,
                source.external_id,
                serde_json::to_string(&source.extras)?,
                source.is_active,
                source.updated_at,
            ],
        );
        match changed {
            Ok(0) => Err(StorageError::SourceNotFound(source.id.0)),
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StorageError::DuplicateSource {
                    owner: source.owner_ref().url(),
                    mnemonic: source.mnemonic.clone(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn deactivate_source(&mut self, id: SourceId) -> Result<(), StorageError> {
        let changed = self.conn.execute(
            "UPDATE sources SET is_active = 0, updated_at = ?2 WHERE id = ?1",
            params![id.0, chrono::Utc::now()],
        )?;
        if changed == 0 {
            return Err(StorageError::SourceNotFound(id.0));
        }
        Ok(())
    }

    fn list_sources(&self, owner: Option<&OwnerRef>) -> Result<Vec<Source>, StorageError> {
        match owner {
            Some(owner) => self.query_sources(
                &format!(
                    "SELECT {SOURCE_COLUMNS} FROM sources \
                     WHERE is_active = 1 AND owner_type = ?1 AND owner = ?2 ORDER BY id"
                ),
                params![owner.owner_type.as_str(), owner.name],
            ),
            None => self.query_sources(
                &format!("SELECT {SOURCE_COLUMNS} FROM sources WHERE is_active = 1 ORDER BY id"),
                [],
            ),
        }
    }

    fn create_version(&mut self, version: &SourceVersion) -> Result<SourceVersion, StorageError> {
        let tx = self.conn.transaction()?;

        let parent_exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM sources WHERE id = ?1)",
            params![version.source.0],
            |row| row.get(0),
        )?;
        if !parent_exists {
            return Err(StorageError::SourceNotFound(version.source.0));
        }
        if Self::active_version_exists(&tx, version.source, &version.mnemonic, VersionId(0))? {
            return Err(StorageError::DuplicateVersion {
                source_id: version.source.0,
                mnemonic: version.mnemonic.clone(),
            });
        }

        let stored = Self::insert_version(&tx, version)?;
        tx.commit()?;
        Ok(stored)
    }

    fn get_version(
        &self,
        source: SourceId,
        mnemonic: &str,
    ) -> Result<Option<SourceVersion>, StorageError> {
        let sql = format!(
            "SELECT {VERSION_COLUMNS} FROM source_versions \
             WHERE source_id = ?1 AND mnemonic = ?2 AND is_active = 1"
        );
        let raw = self
            .conn
            .query_row(&sql, params![source.0, mnemonic], Self::read_version_row)
            .optional()?;
        raw.map(Self::decode_version).transpose()
    }

    fn update_version(&mut self, version: &SourceVersion) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;

        if version.is_active
            && Self::active_version_exists(&tx, version.source, &version.mnemonic, version.id)?
        {
            return Err(StorageError::DuplicateVersion {
                source_id: version.source.0,
                mnemonic: version.mnemonic.clone(),
            });
        }

        let changed = tx.execute(
            "UPDATE source_versions SET mnemonic = ?2, released = ?3, description = ?4, \
             external_id = ?5, extras_json = ?6, is_active = ?7, previous_version = ?8, \
             parent_version = ?9, concepts_json = ?10, mappings_json = ?11, updated_at = ?12 \
             WHERE id = ?1",
            params![
                version.id.0,
                version.mnemonic,
                version.released,
                version.description,
                version.external_id,
                serde_json::to_string(&version.extras)?,
                version.is_active,
                version.previous_version,
                version.parent_version,
                serde_json::to_string(&version.concepts)?,
                serde_json::to_string(&version.mappings)?,
                version.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::VersionNotFound(version.id.0));
        }
        if version.released && version.is_active {
            Self::unrelease_siblings(&tx, version.source, version.id)?;
        }

        tx.commit()?;
        Ok(())
    }

    fn deactivate_version(&mut self, id: VersionId) -> Result<(), StorageError> {
        let changed = self.conn.execute(
            "UPDATE source_versions SET is_active = 0, updated_at = ?2 WHERE id = ?1",
            params![id.0, chrono::Utc::now()],
        )?;
        if changed == 0 {
            return Err(StorageError::VersionNotFound(id.0));
        }
        Ok(())
    }

    fn list_versions(&self, source: SourceId) -> Result<Vec<SourceVersion>, StorageError> {
        self.query_versions(
            &format!(
                "SELECT {VERSION_COLUMNS} FROM source_versions \
                 WHERE source_id = ?1 AND is_active = 1 ORDER BY id DESC"
            ),
            params![source.0],
        )
    }

    fn find_released_version(
        &self,
        source: SourceId,
    ) -> Result<Option<SourceVersion>, StorageError> {
        let sql = format!(
            "SELECT {VERSION_COLUMNS} FROM source_versions \
             WHERE source_id = ?1 AND released = 1 AND is_active = 1 ORDER BY id DESC LIMIT 1"
        );
        let raw = self
            .conn
            .query_row(&sql, params![source.0], Self::read_version_row)
            .optional()?;
        raw.map(Self::decode_version).transpose()
    }

    fn find_child_versions(
        &self,
        source: SourceId,
        parent: &str,
    ) -> Result<Vec<SourceVersion>, StorageError> {
        self.query_versions(
            &format!(
                "SELECT {VERSION_COLUMNS} FROM source_versions \
                 WHERE source_id = ?1 AND parent_version = ?2 AND is_active = 1 ORDER BY id DESC"
            ),
            params![source.0, parent],
        )
    }

    fn create_concept(&mut self, concept: &ConceptVersion) -> Result<ConceptVersion, StorageError> {
        self.conn.execute(
            "INSERT INTO concept_versions (mnemonic, display_name, display_locale, \
             concept_class, datatype, retired, is_active) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                concept.mnemonic,
                concept.display_name,
                concept.display_locale,
                concept.concept_class,
                concept.datatype,
                concept.retired,
                concept.is_active,
            ],
        )?;
        let mut stored = concept.clone();
        stored.id = ConceptId(self.conn.last_insert_rowid());
        Ok(stored)
    }

    fn create_mapping(&mut self, mapping: &Mapping) -> Result<Mapping, StorageError> {
        self.conn.execute(
            "INSERT INTO mappings (map_type, from_concept, to_concept, external_id, retired, \
             is_active) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                mapping.map_type,
                mapping.from_concept,
                mapping.to_concept,
                mapping.external_id,
                mapping.retired,
                mapping.is_active,
            ],
        )?;
        let mut stored = mapping.clone();
        stored.id = MappingId(self.conn.last_insert_rowid());
        Ok(stored)
    }

    fn find_concepts(
        &self,
        filter: &ChildFilter<ConceptId>,
    ) -> Result<Vec<ConceptVersion>, StorageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, mnemonic, display_name, display_locale, concept_class, datatype, \
             retired, is_active FROM concept_versions \
             WHERE id IN rarray(?1) AND is_active = 1 AND (?2 OR retired = 0) \
             ORDER BY id LIMIT ?3",
        )?;
        let rows = stmt.query_map(
            params![
                Self::id_array(&filter.ids, |id| id.0),
                filter.include_retired,
                Self::limit_clause(filter.limit),
            ],
            |row| {
                Ok(ConceptVersion {
                    id: ConceptId(row.get(0)?),
                    mnemonic: row.get(1)?,
                    display_name: row.get(2)?,
                    display_locale: row.get(3)?,
                    concept_class: row.get(4)?,
                    datatype: row.get(5)?,
                    retired: row.get(6)?,
                    is_active: row.get(7)?,
                })
            },
        )?;
        let concepts = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(concepts)
    }

    fn find_mappings(&self, filter: &ChildFilter<MappingId>) -> Result<Vec<Mapping>, StorageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, map_type, from_concept, to_concept, external_id, retired, is_active \
             FROM mappings \
             WHERE id IN rarray(?1) AND is_active = 1 AND (?2 OR retired = 0) \
             ORDER BY id LIMIT ?3",
        )?;
        let rows = stmt.query_map(
            params![
                Self::id_array(&filter.ids, |id| id.0),
                filter.include_retired,
                Self::limit_clause(filter.limit),
            ],
            |row| {
                Ok(Mapping {
                    id: MappingId(row.get(0)?),
                    map_type: row.get(1)?,
                    from_concept: row.get(2)?,
                    to_concept: row.get(3)?,
                    external_id: row.get(4)?,
                    retired: row.get(5)?,
                    is_active: row.get(6)?,
                })
            },
        )?;
        let mappings = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(mappings)
    }

    fn add_org_member(&mut self, org: &str, user: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO org_members (org, username) VALUES (?1, ?2)",
            params![org, user],
        )?;
        Ok(())
    }

    fn is_org_member(&self, org: &str, user: &str) -> Result<bool, StorageError> {
        Ok(self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM org_members WHERE org = ?1 AND username = ?2)",
            params![org, user],
            |row| row.get(0),
        )?)
    }
}
