use super::*;

fn text(s: &str) -> Block {
    Block::Text(s.to_string())
}

#[test]
fn each_top_level_block_is_one_item() {
    let out = fragment_blocks("<p>First paragraph</p>\n<h2>Heading</h2><blockquote>Quoted</blockquote>");
    assert_eq!(out, vec![text("First paragraph"), text("Heading"), text("Quoted")]);
}

#[test]
fn top_level_inline_run_is_one_block() {
    let out = fragment_blocks("Some <b>bold</b> and <a href='#'>linked</a> text<p>After</p>");
    assert_eq!(out, vec![text("Some bold and linked text"), text("After")]);
}

#[test]
fn nested_blocks_keep_line_breaks() {
    let out = fragment_blocks("<div><p>Line one</p><p>Line   two<br>three</p></div>");
    assert_eq!(out, vec![text("Line one\nLine two\nthree")]);
}

#[test]
fn lists_yield_one_item_per_entry() {
    let out = fragment_blocks("<ul><li>Alpha</li><li> </li><li>Beta <em>b</em></li></ul><ol><li>Gamma</li></ol>");
    assert_eq!(out, vec![text("Alpha"), text("Beta b"), text("Gamma")]);
}

#[test]
fn decoration_only_blocks_are_skipped() {
    let out = fragment_blocks("<p>•</p><p>   </p><span>|</span><p>Real</p>");
    assert_eq!(out, vec![text("Real")]);
}

#[test]
fn scripts_and_styles_are_ignored() {
    let out = fragment_blocks("<p>Visible<script>var x = 1;</script></p><style>p{}</style>");
    assert_eq!(out, vec![text("Visible")]);
}

#[test]
fn images_keep_their_position() {
    let out = fragment_blocks(r#"<p>Before</p><figure><img src="a.png"><figcaption>Caption</figcaption></figure><p>After</p>"#);
    assert_eq!(out, vec![text("Before"), Block::Image("a.png".into()), text("Caption"), text("After")]);
}

#[test]
fn src_wins_over_srcset() {
    let out = fragment_blocks(r#"<img src="main.jpg" srcset="small.jpg 320w, big.jpg 640w"><img srcset="small.jpg 320w">"#);
    assert_eq!(out, vec![Block::Image("main.jpg".into()), Block::Image("small.jpg".into())]);
}

#[test]
fn picture_uses_inner_img_then_sources() {
    let out = fragment_blocks(r#"<picture><source srcset="wide.webp 2x"><img src="fallback.png"></picture>"#);
    assert_eq!(out, vec![Block::Image("fallback.png".into())]);
    let out = fragment_blocks(r#"<picture><source srcset="wide.webp 2x"></picture>"#);
    assert_eq!(out, vec![Block::Image("wide.webp".into())]);
}

#[test]
fn inline_background_image_is_an_image() {
    let out = fragment_blocks(r#"<div style="color: red; background-image: url('hero.jpg')">Title</div>"#);
    assert_eq!(out, vec![Block::Image("hero.jpg".into()), text("Title")]);
}

#[test]
fn image_inside_link_is_found() {
    let out = fragment_blocks(r#"Read <a href="/x"><img src="thumb.png"></a> more"#);
    assert_eq!(out, vec![text("Read"), Block::Image("thumb.png".into()), text("more")]);
}

#[test]
fn inline_svg_is_serialized() {
    let out = fragment_blocks(r#"<svg width="10" height="10"><rect width="5" height="5"></rect></svg>"#);
    let [Block::Svg(markup)] = out.as_slice() else { panic!("expected one svg, got {out:?}") };
    assert!(markup.starts_with("<svg"));
    assert!(markup.contains("<rect"));
    assert!(markup.ends_with("</svg>"));
}

#[test]
fn video_and_iframe_sources() {
    let out = fragment_blocks(concat!(
        r#"<video><source src="clip.mp4" type="video/mp4"></video>"#,
        r#"<iframe src="https://player.vimeo.com/video/1"></iframe>"#,
        "<video></video>",
    ));
    assert_eq!(out, vec![Block::Media("clip.mp4".into()), Block::Media("https://player.vimeo.com/video/1".into())]);
}

#[test]
fn fragments_concatenate_in_order() {
    let out = blocks(&["<p>One</p>".to_string(), "<p>Two</p>".to_string()]);
    assert_eq!(out, vec![text("One"), text("Two")]);
}
