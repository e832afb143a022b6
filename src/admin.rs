//! Admin site registry.
//!
//! Which entities get a management view, and with which columns, filters,
//! field groups and inline tables. The site is built once at startup (from
//! configuration or [`AdminSite::default`]) and handed to the presentation
//! layer; nothing here is global state.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{GENRE_HELP, ISBN_HELP, SUMMARY_HELP},
        book_instance::{DueBackFilter, LoanStatus},
        genre::GENRE_NAME_HELP,
        language::LANGUAGE_NAME_HELP,
    },
};

/// Entities known to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Genre,
    Language,
    Author,
    Book,
    BookInstance,
}

impl EntityKind {
    /// Fields a column, filter or fieldset may refer to
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Genre | EntityKind::Language => &["id", "name"],
            EntityKind::Author => &["id", "first_name", "last_name", "date_of_birth", "date_of_death"],
            EntityKind::Book => &[
                "id",
                "title",
                "summary",
                "isbn",
                "author",
                "language",
                "genre",
                "display_genre",
            ],
            EntityKind::BookInstance => &["id", "book", "imprint", "due_back", "status"],
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields().contains(&field)
    }

    pub fn verbose_name(&self) -> &'static str {
        match self {
            EntityKind::Genre => "genre",
            EntityKind::Language => "language",
            EntityKind::Author => "author",
            EntityKind::Book => "book",
            EntityKind::BookInstance => "book instance",
        }
    }

    /// Column header for a field
    pub fn field_label(&self, field: &str) -> String {
        match (self, field) {
            (EntityKind::Author, "date_of_death") => "Died".to_string(),
            (EntityKind::Book, "isbn") => "ISBN".to_string(),
            (EntityKind::Book, "display_genre") => "Genre".to_string(),
            (_, "id") => "ID".to_string(),
            _ => {
                let spaced = field.replace('_', " ");
                let mut chars = spaced.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }

    /// Hint shown next to a form field
    pub fn help_text(&self, field: &str) -> Option<&'static str> {
        match (self, field) {
            (EntityKind::Genre, "name") => Some(GENRE_NAME_HELP),
            (EntityKind::Language, "name") => Some(LANGUAGE_NAME_HELP),
            (EntityKind::Book, "summary") => Some(SUMMARY_HELP),
            (EntityKind::Book, "isbn") => Some(ISBN_HELP),
            (EntityKind::Book, "genre") => Some(GENRE_HELP),
            (EntityKind::BookInstance, "id") => {
                Some("Unique ID for this particular book across whole library")
            }
            (EntityKind::BookInstance, "status") => Some("book availability"),
            _ => None,
        }
    }

    /// Choices offered by a list filter, as (query value, label)
    pub fn filter_choices(&self, field: &str) -> Vec<(&'static str, &'static str)> {
        match (self, field) {
            (EntityKind::BookInstance, "status") => LoanStatus::ALL
                .iter()
                .map(|s| (s.code(), s.label()))
                .chain(std::iter::once(("blank", "Blank")))
                .collect(),
            (EntityKind::BookInstance, "due_back") => DueBackFilter::ALL
                .iter()
                .map(|f| match f {
                    DueBackFilter::Today => ("today", f.label()),
                    DueBackFilter::PastSevenDays => ("past_seven_days", f.label()),
                    DueBackFilter::ThisMonth => ("this_month", f.label()),
                    DueBackFilter::ThisYear => ("this_year", f.label()),
                    DueBackFilter::NoDate => ("no_date", f.label()),
                    DueBackFilter::HasDate => ("has_date", f.label()),
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// One line of a fieldset: a single field or several fields side by side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldLine {
    Single(String),
    Row(Vec<String>),
}

impl FieldLine {
    pub fn fields(&self) -> Vec<&str> {
        match self {
            FieldLine::Single(field) => vec![field.as_str()],
            FieldLine::Row(fields) => fields.iter().map(String::as_str).collect(),
        }
    }
}

/// Titled group of fields on the edit form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fieldset {
    #[serde(default)]
    pub title: Option<String>,
    pub lines: Vec<FieldLine>,
}

/// Related records edited inline with their parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineAdmin {
    pub model: EntityKind,
    #[serde(default)]
    pub list_display: Vec<String>,
}

/// Per-entity management view configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAdmin {
    pub list_display: Vec<String>,
    #[serde(default)]
    pub list_filter: Vec<String>,
    #[serde(default)]
    pub fieldsets: Vec<Fieldset>,
    #[serde(default)]
    pub inlines: Vec<InlineAdmin>,
}

fn strings(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

impl ModelAdmin {
    /// Registration without customisation: the label column only
    pub fn simple() -> Self {
        Self {
            list_display: strings(&["name"]),
            list_filter: Vec::new(),
            fieldsets: Vec::new(),
            inlines: Vec::new(),
        }
    }

    pub fn column_headers(&self, kind: EntityKind) -> Vec<String> {
        self.list_display.iter().map(|c| kind.field_label(c)).collect()
    }

    /// Project a serialisable list row onto the configured columns
    pub fn render_row<T: Serialize>(&self, row: &T) -> AppResult<Vec<serde_json::Value>> {
        let value = serde_json::to_value(row)
            .map_err(|e| AppError::Internal(format!("Failed to serialise list row: {}", e)))?;
        let object = value
            .as_object()
            .ok_or_else(|| AppError::Internal("List row is not a record".to_string()))?;

        self.list_display
            .iter()
            .map(|column| {
                object.get(column).cloned().ok_or_else(|| {
                    AppError::Internal(format!("List row has no column '{}'", column))
                })
            })
            .collect()
    }

    fn validate(&self, kind: EntityKind) -> AppResult<()> {
        let unknown = |field: &str, what: &str, target: EntityKind| {
            AppError::Configuration(format!(
                "{} '{}' is not a field of {}",
                what,
                field,
                target.verbose_name()
            ))
        };

        for column in &self.list_display {
            if !kind.has_field(column) {
                return Err(unknown(column, "list_display column", kind));
            }
        }
        for filter in &self.list_filter {
            if !kind.has_field(filter) {
                return Err(unknown(filter, "list_filter", kind));
            }
        }

        let mut seen: Vec<&str> = Vec::new();
        for field in self.fieldsets.iter().flat_map(|fs| fs.lines.iter().flat_map(FieldLine::fields)) {
            if !kind.has_field(field) {
                return Err(unknown(field, "fieldset field", kind));
            }
            if seen.contains(&field) {
                return Err(AppError::Configuration(format!(
                    "Field '{}' appears more than once in the {} fieldsets",
                    field,
                    kind.verbose_name()
                )));
            }
            seen.push(field);
        }

        for inline in &self.inlines {
            for column in &inline.list_display {
                if !inline.model.has_field(column) {
                    return Err(unknown(column, "inline column", inline.model));
                }
            }
        }
        Ok(())
    }
}

/// Registered entities in registration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminSite {
    models: IndexMap<EntityKind, ModelAdmin>,
}

impl AdminSite {
    pub fn empty() -> Self {
        Self { models: IndexMap::new() }
    }

    pub fn register(&mut self, kind: EntityKind, admin: ModelAdmin) -> &mut Self {
        self.models.insert(kind, admin);
        self
    }

    pub fn get(&self, kind: EntityKind) -> AppResult<&ModelAdmin> {
        self.models.get(&kind).ok_or_else(|| {
            AppError::NotFound(format!("No admin registered for {}", kind.verbose_name()))
        })
    }

    pub fn is_registered(&self, kind: EntityKind) -> bool {
        self.models.contains_key(&kind)
    }

    pub fn models(&self) -> impl Iterator<Item = (&EntityKind, &ModelAdmin)> {
        self.models.iter()
    }

    /// Check every referenced field exists on its entity
    pub fn validate(&self) -> AppResult<()> {
        self.models
            .iter()
            .try_for_each(|(kind, admin)| admin.validate(*kind))
    }
}

/// The catalog registrations
impl Default for AdminSite {
    fn default() -> Self {
        let mut site = AdminSite::empty();
        site.register(EntityKind::Genre, ModelAdmin::simple())
            .register(EntityKind::Language, ModelAdmin::simple())
            .register(
                EntityKind::Book,
                ModelAdmin {
                    list_display: strings(&["title", "author", "display_genre"]),
                    list_filter: Vec::new(),
                    fieldsets: Vec::new(),
                    inlines: vec![InlineAdmin {
                        model: EntityKind::BookInstance,
                        list_display: strings(&["book", "status", "due_back", "id"]),
                    }],
                },
            )
            .register(
                EntityKind::BookInstance,
                ModelAdmin {
                    list_display: strings(&["book", "status", "due_back"]),
                    list_filter: strings(&["status", "due_back"]),
                    fieldsets: vec![
                        Fieldset {
                            title: None,
                            lines: vec![
                                FieldLine::Single("book".into()),
                                FieldLine::Single("imprint".into()),
                                FieldLine::Single("id".into()),
                            ],
                        },
                        Fieldset {
                            title: Some("Availability".to_string()),
                            lines: vec![
                                FieldLine::Single("status".into()),
                                FieldLine::Single("due_back".into()),
                            ],
                        },
                    ],
                    inlines: Vec::new(),
                },
            )
            .register(
                EntityKind::Author,
                ModelAdmin {
                    list_display: strings(&["last_name", "first_name", "date_of_birth", "date_of_death"]),
                    list_filter: Vec::new(),
                    fieldsets: vec![Fieldset {
                        title: None,
                        lines: vec![
                            FieldLine::Single("last_name".into()),
                            FieldLine::Single("first_name".into()),
                            FieldLine::Row(strings(&["date_of_birth", "date_of_death"])),
                        ],
                    }],
                    inlines: vec![InlineAdmin {
                        model: EntityKind::Book,
                        list_display: Vec::new(),
                    }],
                },
            );
        site
    }
}
