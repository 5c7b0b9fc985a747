use std::collections::HashMap;

use tantivy::tokenizer::{LowerCaser, RemoveLongFilter, SimpleTokenizer, StopWordFilter, TextAnalyzer, TokenStream};

pub const MAX_TOKEN_BYTES: usize = 40;
pub const MIN_TOKEN_CHARS: usize = 2;

/// The 318-word English list shipped with scikit-learn (`ENGLISH_STOP_WORDS`),
/// itself taken from the Glasgow Information Retrieval Group.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
	"a","about","above","across","after","afterwards","again","against","all","almost","alone","along","already","also","although","always","am","among","amongst","amoungst","amount","an","and","another","any","anyhow","anyone","anything","anyway","anywhere","are","around","as","at",
	"back","be","became","because","become","becomes","becoming","been","before","beforehand","behind","being","below","beside","besides","between","beyond","bill","both","bottom","but","by",
	"call","can","cannot","cant","co","con","could","couldnt","cry",
	"de","describe","detail","do","done","down","due","during",
	"each","eg","eight","either","eleven","else","elsewhere","empty","enough","etc","even","ever","every","everyone","everything","everywhere","except",
	"few","fifteen","fifty","fill","find","fire","first","five","for","former","formerly","forty","found","four","from","front","full","further",
	"get","give","go",
	"had","has","hasnt","have","he","hence","her","here","hereafter","hereby","herein","hereupon","hers","herself","him","himself","his","how","however","hundred",
	"i","ie","if","in","inc","indeed","interest","into","is","it","its","itself",
	"keep","last","latter","latterly","least","less","ltd",
	"made","many","may","me","meanwhile","might","mill","mine","more","moreover","most","mostly","move","much","must","my","myself",
	"name","namely","neither","never","nevertheless","next","nine","no","nobody","none","noone","nor","not","nothing","now","nowhere",
	"of","off","often","on","once","one","only","onto","or","other","others","otherwise","our","ours","ourselves","out","over","own",
	"part","per","perhaps","please","put","rather","re",
	"same","see","seem","seemed","seeming","seems","serious","several","she","should","show","side","since","sincere","six","sixty","so","some","somehow","someone","something","sometime","sometimes","somewhere","still","such","system",
	"take","ten","than","that","the","their","them","themselves","then","thence","there","thereafter","thereby","therefore","therein","thereupon","these","they","thick","thin","third","this","those","though","three","through","throughout","thru","thus","to","together","too","top","toward","towards","twelve","twenty","two",
	"un","under","until","up","upon","us","very","via",
	"was","we","well","were","what","whatever","when","whence","whenever","where","whereafter","whereas","whereby","wherein","whereupon","wherever","whether","which","while","whither","who","whoever","whole","whom","whose","why","will","with","within","without","would",
	"yet","you","your","yours","yourself","yourselves",
];

pub fn build_analyzer() -> TextAnalyzer {
	TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(RemoveLongFilter::limit(MAX_TOKEN_BYTES))
		.filter(LowerCaser)
		.filter(StopWordFilter::remove(ENGLISH_STOP_WORDS.iter().map(|s| s.to_string())))
		.build()
}

/// Turns text into the unigram/bigram features counted by the TF-IDF model.
#[derive(Clone)]
pub struct TermExtractor {
	analyzer: TextAnalyzer,
	ngram_range: (usize, usize),
}

impl TermExtractor {
	/// `ngram_range` is inclusive on both ends and must satisfy `1 <= min <= max`.
	pub fn new(ngram_range: (usize, usize)) -> Self { Self { analyzer: build_analyzer(), ngram_range } }

	/// Lowercased tokens with stop-words and single characters removed.
	pub fn tokens(&self, text: &str) -> Vec<String> {
		let mut analyzer = self.analyzer.clone();
		let mut stream = analyzer.token_stream(text);
		let mut tokens = Vec::new();
		while stream.advance() {
			let token = &stream.token().text;
			if token.chars().count() >= MIN_TOKEN_CHARS { tokens.push(token.clone()); }
		}
		tokens
	}

	/// Contiguous n-grams of the filtered token stream, words joined by one space.
	pub fn features(&self, text: &str) -> Vec<String> {
		let tokens = self.tokens(text);
		let (min_n, max_n) = self.ngram_range;
		let mut features = Vec::new();
		for n in min_n.max(1)..=max_n {
			features.extend(tokens.windows(n).map(|w| w.join(" ")));
		}
		features
	}

	pub fn term_counts(&self, text: &str) -> HashMap<String, u32> {
		let mut counts = HashMap::new();
		for feature in self.features(text) { *counts.entry(feature).or_insert(0) += 1; }
		counts
	}
}

impl Default for TermExtractor {
	fn default() -> Self { Self::new((1, 2)) }
}
