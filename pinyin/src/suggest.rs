//! Pinyin → word suggestions for the input box.
//!
//! A small built-in word table keyed by toneless pinyin. Lookups combine the
//! exact key, keys extending the input, and two-part segmentations of the
//! input. Picking a word bumps its frequency for later lookups.
use ahash::AHashMap;
use once_cell::sync::Lazy;
use tracing::debug;

/// Maximum number of suggestions returned by `candidates`.
pub const MAX_CANDIDATES: usize = 20;
/// Below this many exact hits, prefix-extended keys are consulted too.
const PREFIX_FILL_THRESHOLD: usize = 5;
/// Inputs at least this long are also tried as two segments.
const MIN_SEGMENT_INPUT: usize = 4;
const MAX_SEGMENT_RESULTS: usize = 10;
const SEGMENT_FANOUT: usize = 3;

/// Built-in words, most frequent first.
const COMMON_WORDS: &[(&str, &[&str])] = &[
    ("ni", &["你", "泥", "倪", "尼", "呢", "妮", "逆", "匿", "拟", "腻"]),
    ("hao", &["好", "号", "浩", "豪", "耗", "郝", "毫", "嚎", "壕", "蒿"]),
    ("ma", &["吗", "妈", "马", "麻", "码", "蚂", "骂", "嘛", "玛", "蟆"]),
    ("de", &["的", "得", "地", "德", "底"]),
    ("wo", &["我", "窝", "沃", "握", "斡", "卧", "渥", "蜗", "涡", "挝"]),
    (
        "shi",
        &[
            "是", "时", "十", "使", "世", "市", "师", "诗", "式", "士", "事", "史", "识", "石",
            "拾", "食", "始", "试", "视",
        ],
    ),
    ("bu", &["不", "部", "步", "布", "补", "捕", "卜", "哺", "埠", "簿"]),
    ("zai", &["在", "再", "载", "栽", "灾", "宰", "哉", "仔", "崽"]),
    ("ren", &["人", "任", "认", "仁", "忍", "韧", "刃", "纫", "壬", "饪"]),
    (
        "you",
        &[
            "有", "由", "又", "右", "油", "游", "友", "优", "尤", "忧", "幼", "诱", "悠", "邮",
            "犹", "佑", "釉",
        ],
    ),
    (
        "he",
        &["和", "何", "合", "河", "核", "盒", "贺", "喝", "赫", "荷", "鹤", "褐"],
    ),
    ("ta", &["他", "她", "它", "踏", "塌", "塔", "獭", "挞", "蹋", "榻"]),
    ("men", &["们", "门", "闷", "扪", "焖", "懑"]),
    ("zhe", &["这", "着", "者", "折", "遮", "哲", "蔗", "锗", "褶", "辙"]),
    (
        "ge",
        &[
            "个", "各", "格", "歌", "哥", "割", "革", "葛", "隔", "戈", "鸽", "搁", "疙", "咯",
        ],
    ),
    (
        "zhong",
        &["中", "种", "重", "众", "终", "钟", "忠", "衷", "肿", "仲", "踵"],
    ),
    ("guo", &["国", "过", "果", "郭", "锅", "裹", "帼", "椁", "蝈", "虢"]),
    ("shuo", &["说", "硕", "朔", "烁", "蒴", "槊", "铄"]),
    ("dou", &["都", "斗", "豆", "逗", "兜", "抖", "陡", "痘", "窦", "蚪"]),
    (
        "hui",
        &[
            "会", "回", "挥", "汇", "灰", "绘", "贿", "惠", "毁", "慧", "秽", "烩", "讳", "诲",
        ],
    ),
    (
        "yao",
        &[
            "要", "药", "遥", "腰", "瑶", "摇", "尧", "窑", "谣", "姚", "咬", "邀", "爻", "吆",
        ],
    ),
    (
        "jiu",
        &[
            "就", "九", "酒", "久", "救", "旧", "究", "纠", "舅", "灸", "疚", "鸠", "咎",
        ],
    ),
    (
        "xiang",
        &[
            "想", "向", "相", "像", "项", "象", "响", "乡", "香", "详", "享", "祥", "箱", "襄",
            "湘", "翔",
        ],
    ),
    ("kan", &["看", "砍", "堪", "坎", "刊", "瞰", "侃", "勘", "龛", "戡"]),
    ("lai", &["来", "赖", "莱", "濑", "籁", "涞", "徕", "睐"]),
    (
        "ke",
        &[
            "可", "科", "克", "客", "刻", "课", "颗", "棵", "柯", "磕", "咳", "渴", "坷", "苛",
        ],
    ),
    (
        "yi",
        &[
            "一", "以", "已", "意", "义", "益", "亿", "易", "医", "艺", "食", "仪", "衣", "依",
            "移",
        ],
    ),
    (
        "jing",
        &[
            "经", "京", "精", "惊", "晶", "睛", "景", "境", "静", "镜", "径", "竞", "净", "敬",
        ],
    ),
    (
        "chang",
        &["常", "长", "场", "厂", "昌", "畅", "尝", "肠", "偿", "倡", "唱", "猖"],
    ),
    // two characters
    ("nihao", &["你好", "泥蒿", "拟好"]),
    ("beijing", &["北京", "背景", "背井"]),
    ("shanghai", &["上海"]),
    ("zhongguo", &["中国", "中过", "忠国"]),
    ("pengyou", &["朋友"]),
    ("laoshi", &["老师", "老是", "老实"]),
    ("xuesheng", &["学生", "学声"]),
    ("dianhua", &["电话", "电画"]),
    ("shouji", &["手机", "收集", "收急"]),
    ("diannao", &["电脑"]),
    ("gongzuo", &["工作"]),
    ("xuexiao", &["学校", "学笑", "学效"]),
    ("jiating", &["家庭"]),
    ("shijian", &["时间", "实践"]),
    ("wenti", &["问题"]),
    ("xiexie", &["谢谢"]),
    ("zaijian", &["再见", "在见"]),
    ("mingbai", &["明白"]),
    ("zhidao", &["知道", "直到"]),
    ("xihuan", &["喜欢"]),
    // three and four characters
    ("xiaopengyou", &["小朋友"]),
    ("xiaojiejie", &["小姐姐"]),
    ("daxuesheng", &["大学生"]),
    ("jisuanji", &["计算机"]),
    ("tianqiyubao", &["天气预报"]),
    ("shengrikuaile", &["生日快乐"]),
    ("xinniankuaile", &["新年快乐"]),
];

/// Follow-up words offered after a committed word.
static ASSOCIATIONS: Lazy<AHashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    const DEMONSTRATIVE: &[&str] = &["是", "个", "里", "样", "些", "么"];
    let mut m: AHashMap<&'static str, &'static [&'static str]> = AHashMap::new();
    m.insert("你", &["好", "是", "在", "有", "的", "们"]);
    m.insert("我", &["是", "的", "们", "要", "在", "有", "想", "爱"]);
    m.insert("这", DEMONSTRATIVE);
    m.insert("那", DEMONSTRATIVE);
    m.insert("什么", &["时候", "地方", "东西", "人"]);
    m
});

/// A word and how often it has been picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedWord {
    pub word: String,
    pub frequency: u32,
}

/// Pinyin key → word table with frequency learning.
///
/// Keys keep their insertion order, which breaks ties between prefix keys of
/// equal length.
#[derive(Debug, Clone, Default)]
pub struct SuggestionEngine {
    keys: AHashMap<String, usize>,
    entries: Vec<(String, Vec<SuggestedWord>)>,
}

impl SuggestionEngine {
    /// An engine without any words.
    pub fn empty() -> Self {
        Self::default()
    }

    /// An engine loaded with the built-in common words.
    pub fn new() -> Self {
        let mut engine = Self::empty();
        for (key, words) in COMMON_WORDS {
            for (i, word) in words.iter().enumerate() {
                engine.insert(*key, *word, 1000u32.saturating_sub(10 * i as u32));
            }
        }
        debug!(keys = engine.entries.len(), "suggestion table ready");
        engine
    }

    /// Add `word` under `key`, or raise its frequency to `frequency` if it
    /// is already present with a lower one.
    pub fn insert<K: Into<String>, W: Into<String>>(&mut self, key: K, word: W, frequency: u32) {
        let key = key.into().to_lowercase();
        let word = word.into();
        let idx = match self.keys.get(&key) {
            Some(&idx) => idx,
            None => {
                self.entries.push((key.clone(), Vec::new()));
                self.keys.insert(key, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        let bucket = &mut self.entries[idx].1;
        match bucket.iter_mut().find(|w| w.word == word) {
            Some(existing) => existing.frequency = existing.frequency.max(frequency),
            None => bucket.push(SuggestedWord { word, frequency }),
        }
    }

    /// Words stored under exactly `key`, most frequent first.
    pub fn words(&self, key: &str) -> Vec<&str> {
        match self.keys.get(key) {
            Some(&idx) => by_frequency(&self.entries[idx].1),
            None => Vec::new(),
        }
    }

    /// Suggestions for `pinyin`, best first, at most `MAX_CANDIDATES`.
    pub fn candidates(&self, pinyin: &str) -> Vec<String> {
        let pinyin = pinyin.trim().to_lowercase();
        if pinyin.is_empty() {
            return Vec::new();
        }
        let mut out: Vec<String> = self.words(&pinyin).into_iter().map(String::from).collect();

        if out.len() < PREFIX_FILL_THRESHOLD {
            let mut extended: Vec<&(String, Vec<SuggestedWord>)> = self
                .entries
                .iter()
                .filter(|(k, _)| k.len() > pinyin.len() && k.starts_with(&pinyin))
                .collect();
            extended.sort_by_key(|(k, _)| k.len());
            for (_, words) in extended {
                for w in by_frequency(words) {
                    push_unique(&mut out, w.to_string());
                }
            }
        }

        if pinyin.len() >= MIN_SEGMENT_INPUT {
            for combined in self.segment(&pinyin) {
                push_unique(&mut out, combined);
            }
        }

        out.truncate(MAX_CANDIDATES);
        out
    }

    /// Two-part readings of `pinyin`: a known 2-4 letter head followed by
    /// suggestions for the rest.
    fn segment(&self, pinyin: &str) -> Vec<String> {
        let mut results = Vec::new();
        let max_head = 4.min(pinyin.len().saturating_sub(2));
        for head_len in 2..=max_head {
            if !pinyin.is_char_boundary(head_len) {
                continue;
            }
            let (head, rest) = pinyin.split_at(head_len);
            let heads = self.words(head);
            if heads.is_empty() || rest.len() < 2 {
                continue;
            }
            let tails = self.candidates(rest);
            for h in heads.iter().take(SEGMENT_FANOUT) {
                for t in tails.iter().take(SEGMENT_FANOUT) {
                    results.push(format!("{}{}", h, t));
                    if results.len() >= MAX_SEGMENT_RESULTS {
                        return results;
                    }
                }
            }
        }
        results
    }

    /// Record that `word` was picked for `key`. Unknown pairs are ignored.
    pub fn update_frequency(&mut self, key: &str, word: &str) {
        let Some(&idx) = self.keys.get(key) else {
            return;
        };
        if let Some(w) = self.entries[idx].1.iter_mut().find(|w| w.word == word) {
            w.frequency = w.frequency.saturating_add(1);
        }
    }

    /// Frequency of `word` under `key`.
    pub fn frequency(&self, key: &str, word: &str) -> Option<u32> {
        let &idx = self.keys.get(key)?;
        self.entries[idx]
            .1
            .iter()
            .find(|w| w.word == word)
            .map(|w| w.frequency)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Likely next words after `previous`. Empty for words without a rule.
pub fn associations(previous: &str) -> &'static [&'static str] {
    ASSOCIATIONS.get(previous).copied().unwrap_or(&[])
}

fn by_frequency(words: &[SuggestedWord]) -> Vec<&str> {
    let mut sorted: Vec<&SuggestedWord> = words.iter().collect();
    // stable: equal frequencies keep insertion order
    sorted.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    sorted.into_iter().map(|w| w.word.as_str()).collect()
}

fn push_unique(out: &mut Vec<String>, word: String) {
    if !out.contains(&word) {
        out.push(word);
    }
}
