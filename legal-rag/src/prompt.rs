//! Prompt construction: fixed system instructions + labeled context block.

use crate::types::SearchHit;

/// System instructions for the legal assistant.
///
/// Grounds answers strictly in the supplied documents, asks for statute
/// sections and case numbers when present, and forbids guessing.
pub const SYSTEM_PROMPT: &str = "당신은 형사법 전문 법률 AI 어시스턴트입니다.
주어진 법률 문서(판례, 법령, 결정문, 해석)를 참고하여 사용자의 질문에 정확하고 전문적으로 답변해주세요.

답변 시 주의사항:
1. 반드시 제공된 문서 내용을 근거로 답변하세요.
2. 관련 법령 조항이 있다면 명시해주세요.
3. 판례가 있다면 사건번호와 함께 인용해주세요.
4. 확실하지 않은 내용은 추측하지 마세요.
5. 답변은 명확하고 이해하기 쉽게 작성해주세요.
";

/// Delimiter between context blocks.
const BLOCK_SEPARATOR: &str = "\n---\n";

/// Formats ranked hits into one context string, preserving ranking order.
///
/// Each hit becomes a labeled block `[문서 i] (type_name) - doc_id` followed
/// by the chunk text. No re-ordering, no deduplication across chunks of the
/// same document.
pub fn format_context(hits: &[SearchHit]) -> String {
    let blocks: Vec<String> = hits
        .iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "[문서 {}] ({}) - {}\n{}\n",
                i + 1,
                hit.type_name,
                hit.doc_id,
                hit.content
            )
        })
        .collect();
    blocks.join(BLOCK_SEPARATOR)
}

/// Builds the user message: assembled context followed by the verbatim question.
pub fn build_user_prompt(context: &str, question: &str) -> String {
    format!(
        "다음은 관련 법률 문서입니다:\n\n{context}\n\n---\n\n질문: {question}\n\n위 문서를 참고하여 답변해주세요."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(doc_id: &str, type_name: &str, content: &str, distance: f32) -> SearchHit {
        SearchHit {
            content: content.into(),
            doc_id: doc_id.into(),
            type_name: type_name.into(),
            distance,
        }
    }

    #[test]
    fn context_blocks_follow_ranking_order() {
        let hits = vec![
            hit("A", "판례", "첫 번째 본문", 0.1),
            hit("B", "법령", "두 번째 본문", 0.2),
            hit("C", "해석", "세 번째 본문", 0.3),
        ];
        let ctx = format_context(&hits);

        let a = ctx.find("[문서 1] (판례) - A").unwrap();
        let b = ctx.find("[문서 2] (법령) - B").unwrap();
        let c = ctx.find("[문서 3] (해석) - C").unwrap();
        assert!(a < b && b < c);
        assert_eq!(ctx.matches("---").count(), 2);
    }

    #[test]
    fn user_prompt_embeds_context_then_question() {
        let prompt = build_user_prompt("컨텍스트 본문", "폭행죄의 처벌 기준은?");
        let ctx_pos = prompt.find("컨텍스트 본문").unwrap();
        let q_pos = prompt.find("질문: 폭행죄의 처벌 기준은?").unwrap();
        assert!(ctx_pos < q_pos);
    }
}
