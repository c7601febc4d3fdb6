use anyhow::Context;
use base64::Engine;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::HtmlElement;
use yew::prelude::*;

use vhq_client::toast::ToastKind;
use vhq_client::transcript::{Transcript, export_filename};

async fn copy_to_clipboard(text: &str) -> anyhow::Result<()> {
    let window = web_sys::window().context("No window available")?;
    let promise = window.navigator().clipboard().write_text(text);
    JsFuture::from(promise)
        .await
        .map_err(|e| anyhow::anyhow!("Clipboard write rejected: {e:?}"))?;
    Ok(())
}

#[derive(Properties, PartialEq)]
pub struct TranscriptModalProps {
    pub transcript: Transcript,
    pub title: Option<AttrValue>,
    pub on_close: Callback<()>,
    pub on_toast: Callback<(ToastKind, String)>,
}

/// Transcript of a video. Closed with the close button, a click on the backdrop or Escape.
#[function_component(TranscriptModal)]
pub fn transcript_modal(
    TranscriptModalProps {
        transcript,
        title,
        on_close,
        on_toast,
    }: &TranscriptModalProps,
) -> Html {
    let node = use_node_ref();

    // Focus the modal so that it receives Escape
    use_effect_with((), {
        let node = node.clone();
        move |_| {
            if let Some(element) = node.cast::<HtmlElement>() {
                let _ = element.focus();
            }
        }
    });

    let onkeydown = {
        let on_close = on_close.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Escape" {
                on_close.emit(());
            }
        })
    };
    let on_backdrop = {
        let on_close = on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };
    let on_close_button = on_backdrop.clone();
    let keep_open = Callback::from(|e: MouseEvent| e.stop_propagation());

    let on_copy = {
        let text = transcript.to_text();
        let on_toast = on_toast.clone();
        Callback::from(move |_: MouseEvent| {
            let text = text.clone();
            let on_toast = on_toast.clone();
            spawn_local(async move {
                match copy_to_clipboard(&text).await {
                    Ok(()) => on_toast.emit((
                        ToastKind::Success,
                        "Transcript copied to clipboard!".to_string(),
                    )),
                    Err(e) => {
                        log::warn!("Failed to copy transcript: {e:#}");
                        on_toast.emit((ToastKind::Error, "Failed to copy transcript".to_string()));
                    }
                }
            });
        })
    };

    let export = transcript.export(title.as_deref());
    let encoded = base64::engine::general_purpose::STANDARD.encode(export);
    let href = format!("data:text/plain;charset=utf-8;base64,{encoded}");
    let filename = export_filename(chrono::Utc::now().timestamp_millis());

    html! {
        <div class="modal-backdrop" onclick={on_backdrop}>
            <div class="modal transcript-modal" tabindex="0" ref={node} {onkeydown} onclick={keep_open}>
                <div class="modal-header">
                    <h2>{ "Transcript" }</h2>
                    <button class="modal-close" onclick={on_close_button}>{ "\u{00D7}" }</button>
                </div>
                <div class="transcript-content">
                    {
                        transcript.lines.iter().map(|line| html! {
                            <div class="transcript-entry">
                                <div class="transcript-time">{ &line.time }</div>
                                <div>{ &line.text }</div>
                            </div>
                        }).collect::<Html>()
                    }
                </div>
                <div class="modal-actions button-group">
                    <button class="btn-secondary" onclick={on_copy}>
                        <i class="fas fa-copy"></i>{ " Copy" }
                    </button>
                    <a href={href} download={filename} class="btn-primary no-underline">
                        <i class="fas fa-download"></i>{ " Download" }
                    </a>
                </div>
            </div>
        </div>
    }
}
