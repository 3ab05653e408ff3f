use std::fmt;

/// Fixed set of resource categories offered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Notes,
    PqImages,
    PqFiles,
    Textbooks,
    Code,
    Others,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Notes,
        Category::PqImages,
        Category::PqFiles,
        Category::Textbooks,
        Category::Code,
        Category::Others,
    ];

    /// Button text.
    pub fn label(self) -> &'static str {
        match self {
            Category::Notes => "Notes",
            Category::PqImages => "PQimages",
            Category::PqFiles => "PQfiles",
            Category::Textbooks => "Textbooks",
            Category::Code => "Code",
            Category::Others => "Others",
        }
    }

    /// Value stored as `resource_type`.
    pub fn slug(self) -> &'static str {
        match self {
            Category::Notes => "notes",
            Category::PqImages => "pqimages",
            Category::PqFiles => "pqfiles",
            Category::Textbooks => "textbooks",
            Category::Code => "code",
            Category::Others => "others",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|category| category.slug() == slug)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
