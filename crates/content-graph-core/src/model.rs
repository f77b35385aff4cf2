use serde::Serialize;

/// Closed set of object kinds the resolver can produce.
///
/// Serializes as the `__typename` carried by every resolved object.
#[derive(Debug, Clone, Copy, Serialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ObjectKind {
    Movie,
    Episode,
    Season,
    Brand,
    LiveStream,
    Article,
    Person,
    Credit,
    Genre,
    Theme,
    #[serde(rename = "SkylarkTag")]
    Tag,
    Rating,
    Role,
    #[serde(rename = "SkylarkImage")]
    Image,
    CallToAction,
    Availability,
    #[serde(rename = "SkylarkSet")]
    Set,
    SetContent,
}

impl ObjectKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "Movie",
            Self::Episode => "Episode",
            Self::Season => "Season",
            Self::Brand => "Brand",
            Self::LiveStream => "LiveStream",
            Self::Article => "Article",
            Self::Person => "Person",
            Self::Credit => "Credit",
            Self::Genre => "Genre",
            Self::Theme => "Theme",
            Self::Tag => "SkylarkTag",
            Self::Rating => "Rating",
            Self::Role => "Role",
            Self::Image => "SkylarkImage",
            Self::CallToAction => "CallToAction",
            Self::Availability => "Availability",
            Self::Set => "SkylarkSet",
            Self::SetContent => "SetContent",
        }
    }

    /// Map a content type discriminator to its kind.
    ///
    /// Matching ignores case, `-`, `_` and spaces, and accepts singular and plural forms.
    /// Only kinds that can appear as content records are recognized.
    #[must_use]
    pub fn from_discriminator(value: &str) -> Option<Self> {
        let key: String = value
            .chars()
            .filter(|ch| !matches!(ch, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "movie" | "movies" => Some(Self::Movie),
            "episode" | "episodes" => Some(Self::Episode),
            "season" | "seasons" => Some(Self::Season),
            "brand" | "brands" => Some(Self::Brand),
            "livestream" | "livestreams" => Some(Self::LiveStream),
            "article" | "articles" => Some(Self::Article),
            "skylarkset" | "skylarksets" | "set" | "sets" => Some(Self::Set),
            _ => None,
        }
    }

    /// Kinds resolved through the shared media pipeline.
    #[must_use]
    pub fn is_media(self) -> bool {
        matches!(self, Self::Movie | Self::Episode | Self::Season | Self::Brand | Self::LiveStream)
    }
}

/// Relationship envelope. A relationship that was cut by the depth budget is `None` at the
/// field level instead of an empty connection.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Connection<T> {
    pub objects: Vec<T>,
    pub count: usize,
    pub next_token: Option<String>,
}

impl<T> Connection<T> {
    #[must_use]
    pub fn new(objects: Vec<T>) -> Self {
        Self { count: objects.len(), objects, next_token: None }
    }

    /// Wrap an expansion result; `None` stays `None`.
    #[must_use]
    pub fn wrap(objects: Option<Vec<T>>) -> Option<Self> {
        objects.map(Self::new)
    }
}

/// Plain list wrapper for fields that are always resolved.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ObjectList<T> {
    pub objects: Vec<T>,
}

impl<T> ObjectList<T> {
    #[must_use]
    pub fn new(objects: Vec<T>) -> Self {
        Self { objects }
    }
}

impl<T> Default for ObjectList<T> {
    fn default() -> Self {
        Self { objects: Vec::new() }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Image {
    #[serde(rename = "__typename")]
    pub kind: ObjectKind,
    pub uid: String,
    pub external_id: String,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub image_type: String,
    pub url: Option<String>,
    pub external_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Genre {
    #[serde(rename = "__typename")]
    pub kind: ObjectKind,
    pub uid: String,
    pub external_id: String,
    pub name: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Theme {
    #[serde(rename = "__typename")]
    pub kind: ObjectKind,
    pub uid: String,
    pub external_id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Tag {
    #[serde(rename = "__typename")]
    pub kind: ObjectKind,
    pub uid: String,
    pub external_id: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub tag_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Rating {
    #[serde(rename = "__typename")]
    pub kind: ObjectKind,
    pub uid: String,
    pub external_id: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Role {
    #[serde(rename = "__typename")]
    pub kind: ObjectKind,
    pub uid: String,
    pub external_id: String,
    pub title: Option<String>,
    pub title_sort: Option<String>,
    pub internal_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Person {
    #[serde(rename = "__typename")]
    pub kind: ObjectKind,
    pub uid: String,
    pub external_id: String,
    pub slug: Option<String>,
    pub name: Option<String>,
    pub abbreviation: Option<String>,
    pub alias: Option<String>,
    pub bio_long: Option<String>,
    pub bio_medium: Option<String>,
    pub bio_short: Option<String>,
    pub genre: Option<String>,
    pub date_of_birth: Option<String>,
    pub name_sort: Option<String>,
    pub place_of_birth: Option<String>,
    pub images: Option<Connection<Image>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Credit {
    #[serde(rename = "__typename")]
    pub kind: ObjectKind,
    pub uid: String,
    pub external_id: String,
    pub character: Option<String>,
    pub people: Option<Connection<Person>>,
    pub roles: Option<Connection<Role>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CallToAction {
    #[serde(rename = "__typename")]
    pub kind: ObjectKind,
    pub uid: String,
    pub external_id: String,
    pub internal_title: Option<String>,
    #[serde(rename = "type")]
    pub cta_type: Option<String>,
    pub text: Option<String>,
    pub text_short: Option<String>,
    pub description: Option<String>,
    pub description_short: Option<String>,
    pub url: Option<String>,
    pub url_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Availability {
    #[serde(rename = "__typename")]
    pub kind: ObjectKind,
    pub uid: String,
    pub external_id: String,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub starts: Option<String>,
    pub ends: Option<String>,
}

/// Fields shared by every media-like object.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MediaFields {
    pub uid: String,
    pub external_id: String,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub title_short: Option<String>,
    pub title_sort: Option<String>,
    pub synopsis: Option<String>,
    pub synopsis_short: Option<String>,
    pub release_date: Option<String>,
    pub images: Option<Connection<Image>>,
    pub genres: Option<Connection<Genre>>,
    pub themes: Option<Connection<Theme>>,
    pub tags: Option<Connection<Tag>>,
    pub ratings: Option<Connection<Rating>>,
    pub credits: Option<Connection<Credit>>,
    pub availability: ObjectList<Availability>,
    pub call_to_actions: ObjectList<CallToAction>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Movie {
    #[serde(rename = "__typename")]
    pub kind: ObjectKind,
    #[serde(flatten)]
    pub media: MediaFields,
    pub budget: Option<f64>,
    pub audience_rating: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Episode {
    #[serde(rename = "__typename")]
    pub kind: ObjectKind,
    #[serde(flatten)]
    pub media: MediaFields,
    pub episode_number: Option<f64>,
    pub audience_rating: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Season {
    #[serde(rename = "__typename")]
    pub kind: ObjectKind,
    #[serde(flatten)]
    pub media: MediaFields,
    pub season_number: Option<f64>,
    pub preferred_image_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes: Option<ObjectList<Episode>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Brand {
    #[serde(rename = "__typename")]
    pub kind: ObjectKind,
    #[serde(flatten)]
    pub media: MediaFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasons: Option<ObjectList<Season>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LiveStream {
    #[serde(rename = "__typename")]
    pub kind: ObjectKind,
    #[serde(flatten)]
    pub media: MediaFields,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Article {
    #[serde(rename = "__typename")]
    pub kind: ObjectKind,
    pub uid: String,
    pub external_id: String,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    #[serde(rename = "type")]
    pub article_type: Option<String>,
    pub publish_date: Option<String>,
    pub internal_title: Option<String>,
    pub images: Option<Connection<Image>>,
    pub credits: Option<Connection<Credit>>,
    pub tags: Option<Connection<Tag>>,
    pub availability: ObjectList<Availability>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SkylarkSet {
    #[serde(rename = "__typename")]
    pub kind: ObjectKind,
    pub uid: String,
    pub external_id: String,
    pub title: Option<String>,
    pub title_short: Option<String>,
    #[serde(rename = "type")]
    pub set_type: String,
    pub slug: Option<String>,
    pub set_type_slug: Option<String>,
    pub internal_title: Option<String>,
    pub images: Option<Connection<Image>>,
    pub content: Option<Connection<SetContent>>,
    pub call_to_actions: ObjectList<CallToAction>,
}

/// One member of a set, with its 1-based position in the membership list.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SetContent {
    #[serde(rename = "__typename")]
    pub kind: ObjectKind,
    pub dynamic: bool,
    pub position: usize,
    pub object: ResolvedObject,
}

/// A credit seen from the person's side, with the titles that reference it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PersonCredit {
    #[serde(rename = "__typename")]
    pub kind: ObjectKind,
    pub uid: String,
    pub character: Option<String>,
    pub roles: ObjectList<Role>,
    pub movies: ObjectList<Movie>,
    pub episodes: ObjectList<Episode>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ResolvedObject {
    Movie(Movie),
    Episode(Episode),
    Season(Season),
    Brand(Brand),
    LiveStream(LiveStream),
    Article(Article),
    Person(Person),
    Genre(Genre),
    Tag(Tag),
    CallToAction(CallToAction),
    Set(SkylarkSet),
}

impl ResolvedObject {
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Movie(object) => object.kind,
            Self::Episode(object) => object.kind,
            Self::Season(object) => object.kind,
            Self::Brand(object) => object.kind,
            Self::LiveStream(object) => object.kind,
            Self::Article(object) => object.kind,
            Self::Person(object) => object.kind,
            Self::Genre(object) => object.kind,
            Self::Tag(object) => object.kind,
            Self::CallToAction(object) => object.kind,
            Self::Set(object) => object.kind,
        }
    }

    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        match self {
            Self::Movie(object) => Some(&object.media.uid),
            Self::Episode(object) => Some(&object.media.uid),
            Self::Season(object) => Some(&object.media.uid),
            Self::Brand(object) => Some(&object.media.uid),
            Self::LiveStream(object) => Some(&object.media.uid),
            Self::Article(object) => Some(&object.uid),
            Self::Person(object) => Some(&object.uid),
            Self::Genre(object) => Some(&object.uid),
            Self::Tag(object) => Some(&object.uid),
            Self::CallToAction(object) => Some(&object.uid),
            Self::Set(object) => Some(&object.uid),
        }
    }

    pub fn media_mut(&mut self) -> Option<&mut MediaFields> {
        match self {
            Self::Movie(object) => Some(&mut object.media),
            Self::Episode(object) => Some(&mut object.media),
            Self::Season(object) => Some(&mut object.media),
            Self::Brand(object) => Some(&mut object.media),
            Self::LiveStream(object) => Some(&mut object.media),
            _ => None,
        }
    }
}
