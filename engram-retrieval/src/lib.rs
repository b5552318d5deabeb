/*!
# Engram Retrieval

Search over an indexed project: query expansion, hybrid retrieval, and
focus-based result reweighting.

The query is expanded through a static synonym table (direct lookups plus
simple suffix-stripped lookups) to widen lexical recall; the **original**
query is embedded for the vector branch. Hybrid search runs when the
namespace's lexical index is available, otherwise the engine degrades to
vector-only and says so in the response. An optional focus
(code / tests / docs) promotes the matching path category to the front of
the results. A project id with nothing behind it returns an empty result
list, never an error.
*/

mod error;
mod focus;
mod search;
mod synonyms;

pub use error::{Result, RetrievalError};
pub use focus::{classify_path, promote_focus, PathCategory, SearchFocus};
pub use search::{SearchEngine, SearchHit, SearchOptions, SearchResponse, SearchType};
pub use synonyms::expand_query;
