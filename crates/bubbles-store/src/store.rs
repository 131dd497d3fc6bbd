use std::path::{Path, PathBuf};

use bubbles_core::{
    Idea, NewIdea, RankedSourceProvider, SourceFetchFailure, SourceKind, sample_uniform,
    sample_weighted,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rusqlite::{Connection, OptionalExtension, Params, Row, params};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::schema;

const IDEA_COLUMNS: &str = "id, title, description, submitter_name, lightning_address, \
                            created_at, score, exclude_from_display";

/// Largest page size accepted by [`Store::list_page`].
pub const MAX_PAGE_SIZE: usize = 100;

pub struct Store {
    conn: Connection,
}

/// One page of ideas, most voted first.
#[derive(Debug, Clone, Serialize)]
pub struct IdeaPage {
    pub ideas: Vec<Idea>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_ideas: usize,
}

struct IdeaRow {
    id: String,
    title: String,
    description: String,
    submitter_name: Option<String>,
    lightning_address: Option<String>,
    created_at: String,
    score: u32,
    hidden: bool,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<IdeaRow> {
    Ok(IdeaRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        submitter_name: row.get(3)?,
        lightning_address: row.get(4)?,
        created_at: row.get(5)?,
        score: row.get(6)?,
        hidden: row.get::<_, i32>(7)? != 0,
    })
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // --- Writes ---

    /// Validate and insert a submission. Returns the stored idea.
    pub fn insert_idea(&self, new: &NewIdea) -> Result<Idea> {
        let idea = Idea::from_new(new.validate()?);
        self.put_idea(&idea)?;
        tracing::info!(id = %idea.id, title = %idea.title, "idea submitted");
        Ok(idea)
    }

    /// Insert a fully formed idea as-is (imports, fixtures).
    pub fn put_idea(&self, idea: &Idea) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            &format!("INSERT INTO ideas ({IDEA_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
            params![
                idea.id.to_string(),
                idea.title,
                idea.description,
                idea.submitter_name,
                idea.lightning_address,
                idea.created_at,
                idea.score,
                idea.exclude_from_display as i32,
            ],
        )?;
        for (position, tag) in idea.tags.iter().enumerate() {
            tx.execute(
                "INSERT INTO idea_tags (idea_id, position, tag) VALUES (?1, ?2, ?3)",
                params![idea.id.to_string(), position as i64, tag],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Add exactly one vote. Returns the new score.
    pub fn increment_score(&self, id: Uuid) -> Result<u32> {
        let score: Option<u32> = self
            .conn
            .query_row(
                "UPDATE ideas SET score = score + 1 WHERE id = ?1 RETURNING score",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        match score {
            Some(score) => {
                tracing::debug!(%id, score, "vote recorded");
                Ok(score)
            }
            None => Err(StoreError::NotFound(id)),
        }
    }

    pub fn set_hidden(&self, id: Uuid, hidden: bool) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE ideas SET exclude_from_display = ?1 WHERE id = ?2",
            params![hidden as i32, id.to_string()],
        )?;
        if rows == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    // --- Reads ---

    pub fn get_idea(&self, id: Uuid) -> Result<Option<Idea>> {
        let rows = self.query_ideas(
            &format!("SELECT {IDEA_COLUMNS} FROM ideas WHERE id = ?1"),
            [id.to_string()],
        )?;
        Ok(rows.into_iter().next())
    }

    pub fn count_visible(&self) -> Result<usize> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM ideas WHERE exclude_from_display = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }

    /// Paginated listing ordered by score, then newest. `page` is 1-based.
    pub fn list_page(&self, page: usize, limit: usize) -> Result<IdeaPage> {
        if page < 1 {
            return Err(StoreError::InvalidData("invalid page number".into()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(StoreError::InvalidData(format!(
                "invalid limit value (must be 1-{MAX_PAGE_SIZE})"
            )));
        }

        let total_ideas = self.count_visible()?;
        let offset = (page - 1) * limit;
        let ideas = self.query_ideas(
            &format!(
                "SELECT {IDEA_COLUMNS} FROM ideas WHERE exclude_from_display = 0
                 ORDER BY score DESC, created_at DESC, rowid DESC
                 LIMIT ?1 OFFSET ?2"
            ),
            params![limit as i64, offset as i64],
        )?;

        Ok(IdeaPage {
            ideas,
            current_page: page,
            total_pages: total_ideas.div_ceil(limit),
            total_ideas,
        })
    }

    // --- Ranking queries ---

    pub fn newest(&self, limit: usize) -> Result<Vec<Idea>> {
        self.query_ideas(
            &format!(
                "SELECT {IDEA_COLUMNS} FROM ideas WHERE exclude_from_display = 0
                 ORDER BY created_at DESC, rowid DESC LIMIT ?1"
            ),
            [limit as i64],
        )
    }

    /// Highest score first; ties go to the newer idea.
    pub fn most_voted(&self, limit: usize) -> Result<Vec<Idea>> {
        self.query_ideas(
            &format!(
                "SELECT {IDEA_COLUMNS} FROM ideas WHERE exclude_from_display = 0
                 ORDER BY score DESC, created_at DESC, rowid DESC LIMIT ?1"
            ),
            [limit as i64],
        )
    }

    pub fn oldest(&self, limit: usize) -> Result<Vec<Idea>> {
        self.query_ideas(
            &format!(
                "SELECT {IDEA_COLUMNS} FROM ideas WHERE exclude_from_display = 0
                 ORDER BY created_at ASC, rowid ASC LIMIT ?1"
            ),
            [limit as i64],
        )
    }

    pub fn random(&self, limit: usize, rng: &mut impl Rng) -> Result<Vec<Idea>> {
        let pool = self.query_ideas(
            &format!("SELECT {IDEA_COLUMNS} FROM ideas WHERE exclude_from_display = 0"),
            [],
        )?;
        Ok(sample_uniform(&pool, limit, rng))
    }

    /// Sample of voted ideas, weighted by score.
    pub fn random_voted(&self, limit: usize, rng: &mut impl Rng) -> Result<Vec<Idea>> {
        let pool = self.query_ideas(
            &format!(
                "SELECT {IDEA_COLUMNS} FROM ideas WHERE exclude_from_display = 0 AND score > 0"
            ),
            [],
        )?;
        Ok(sample_weighted(&pool, limit, rng))
    }

    pub fn ranked(&self, kind: SourceKind, limit: usize, rng: &mut impl Rng) -> Result<Vec<Idea>> {
        match kind {
            SourceKind::Newest => self.newest(limit),
            SourceKind::MostVoted => self.most_voted(limit),
            SourceKind::Oldest => self.oldest(limit),
            SourceKind::Random => self.random(limit, rng),
            SourceKind::RandomVoted => self.random_voted(limit, rng),
        }
    }

    fn query_ideas(&self, sql: &str, params: impl Params) -> Result<Vec<Idea>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows: Vec<IdeaRow> = stmt
            .query_map(params, read_row)?
            .collect::<std::result::Result<_, _>>()?;
        rows.into_iter().map(|row| self.hydrate(row)).collect()
    }

    fn hydrate(&self, row: IdeaRow) -> Result<Idea> {
        let id = parse_uuid(&row.id)?;
        Ok(Idea {
            id,
            tags: self.load_tags(&row.id)?,
            title: row.title,
            description: row.description,
            submitter_name: row.submitter_name,
            lightning_address: row.lightning_address,
            created_at: row.created_at,
            score: row.score,
            exclude_from_display: row.hidden,
        })
    }

    fn load_tags(&self, idea_id: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT tag FROM idea_tags WHERE idea_id = ?1 ORDER BY position")?;
        let tags = stmt
            .query_map([idea_id], |row| row.get(0))?
            .collect::<std::result::Result<_, _>>()?;
        Ok(tags)
    }
}

impl RankedSourceProvider for Store {
    fn fetch(&self, kind: SourceKind, limit: usize) -> std::result::Result<Vec<Idea>, SourceFetchFailure> {
        let mut rng = SmallRng::from_os_rng();
        self.ranked(kind, limit, &mut rng)
            .map_err(|e| SourceFetchFailure::new(kind, e.to_string()))
    }
}

/// File-backed source provider that opens its own connection per query,
/// so the five queries can run on separate threads.
#[derive(Debug, Clone)]
pub struct StoreSources {
    path: PathBuf,
    seed: Option<u64>,
}

impl StoreSources {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            seed: None,
        }
    }

    /// Make the random queries reproducible.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn rng_for(&self, kind: SourceKind) -> SmallRng {
        match self.seed {
            Some(seed) => {
                let salt = SourceKind::ALL.iter().position(|k| *k == kind).unwrap_or(0) as u64;
                SmallRng::seed_from_u64(seed.wrapping_add(salt))
            }
            None => SmallRng::from_os_rng(),
        }
    }
}

impl RankedSourceProvider for StoreSources {
    fn fetch(&self, kind: SourceKind, limit: usize) -> std::result::Result<Vec<Idea>, SourceFetchFailure> {
        let fail = |e: StoreError| SourceFetchFailure::new(kind, e.to_string());
        let store = Store::open(&self.path).map_err(fail)?;
        let mut rng = self.rng_for(kind);
        store.ranked(kind, limit, &mut rng).map_err(fail)
    }
}

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| StoreError::InvalidData(format!("bad UUID '{s}': {e}")))
}
