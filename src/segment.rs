//! Covering a whole message with independent `(seed, length)` runs.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SearchConfig;
use crate::constraint::Backend;
use crate::error::{Error, Result};
use crate::extract::{CaseMode, Extractor};
use crate::rng::JavaRandom;
use crate::search::find_run;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub seed: u64,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segmentation {
    pub case: CaseMode,
    pub segments: Vec<Segment>,
}

/// The first `length` characters a generator seeded with `seed` produces.
pub fn replay(seed: u64, length: usize, extractor: Extractor) -> Vec<u8> {
    let mut rng = JavaRandom::new(seed);
    (0..length)
        .map(|_| extractor.from_output(rng.next_bits(32)))
        .collect()
}

impl Segmentation {
    pub fn total_len(&self) -> usize {
        self.segments.iter().map(|segment| segment.length).sum()
    }

    /// Replays every segment and concatenates the output.
    pub fn render(&self) -> Vec<u8> {
        let extractor = Extractor::new(self.case);
        self.segments
            .iter()
            .flat_map(|segment| replay(segment.seed, segment.length, extractor))
            .collect()
    }

    /// A Java program printing the message with `java.util.Random`.
    pub fn to_java(&self, class_name: &str) -> String {
        let expression = match self.case {
            CaseMode::Upper => "random.nextInt() & 95",
            CaseMode::Lower => "(random.nextInt() & 127) | 32",
        };
        let entries: String = self
            .segments
            .iter()
            .map(|segment| format!("        s.put({}L, {});\n", segment.seed, segment.length))
            .collect();
        format!(
            r#"import java.util.*;

public class {class_name} {{

    static Map<Long,Integer> s;

    static {{
        s = new LinkedHashMap<>();
{entries}    }}

    public static void main(String args[]) {{
        s.forEach((k,v) -> {{
            Random random = new Random(k);
            for (int i = 0 ; i < v ; i++) {{
                System.out.print((char)({expression}));
            }}
        }});
        System.out.println();
    }}
}}
"#
        )
    }
}

/// Drives [`find_run`] across a message.
///
/// A position no seed can produce ends the segmentation with
/// [`Error::Unmatchable`]; there is no skipping or passthrough.
pub struct Segmenter<'b, B: Backend> {
    backend: &'b B,
    config: SearchConfig,
}

impl<'b, B: Backend> Segmenter<'b, B> {
    pub fn new(backend: &'b B, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Segmenter { backend, config })
    }

    pub fn segment(&self, message: &[u8]) -> Result<Segmentation> {
        let extractor = self.config.extractor();
        let mut segments = Vec::new();
        let mut cursor = 0;

        while cursor < message.len() {
            let run = find_run(self.backend, extractor, message, cursor, self.config.max_depth)?;
            let seed = match run.seed {
                Some(seed) if run.length > 0 => seed,
                _ => {
                    return Err(Error::Unmatchable {
                        offset: cursor,
                        byte: message[cursor],
                    })
                }
            };
            info!(offset = cursor, seed, length = run.length, "matched run");
            segments.push(Segment {
                seed,
                length: run.length,
            });
            cursor += run.length;
        }

        Ok(Segmentation {
            case: self.config.case,
            segments,
        })
    }
}
