//! Seed input: search mode selector plus keyword field.

use leptos::ev::SubmitEvent;
use leptos::prelude::*;

use crate::search::SearchMode;

/// One submitted search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
	/// Raw seed term as typed.
	pub keyword: String,
	/// How the lookup service should interpret it.
	pub mode: SearchMode,
}

fn is_busy(pending: usize) -> bool {
	pending > 0
}

/// Writes a [`SearchRequest`] to `on_search` on Enter or button press.
///
/// Submission is never blocked while earlier searches are in flight;
/// `pending` only drives the progress hint.
#[component]
pub fn SearchBar(
	on_search: WriteSignal<Option<SearchRequest>>,
	#[prop(into)] pending: Signal<usize>,
) -> impl IntoView {
	let (keyword, set_keyword) = signal(String::new());
	let (mode, set_mode) = signal(SearchMode::default());

	let on_submit = move |ev: SubmitEvent| {
		ev.prevent_default();
		on_search.set(Some(SearchRequest {
			keyword: keyword.get_untracked(),
			mode: mode.get_untracked(),
		}));
	};

	let options = SearchMode::ALL
		.into_iter()
		.map(|m| {
			view! {
				<option value=m.query_param() selected=move || mode.get() == m>
					{m.to_string()}
				</option>
			}
		})
		.collect_view();

	view! {
		<form class="search-bar" on:submit=on_submit>
			<select on:change=move |ev| {
				if let Ok(m) = event_target_value(&ev).parse::<SearchMode>() {
					set_mode.set(m);
				}
			}>
				{options}
			</select>
			<input
				type="text"
				placeholder="keyword, username or email"
				prop:value=keyword
				on:input=move |ev| set_keyword.set(event_target_value(&ev))
			/>
			<button type="submit">"Search"</button>
			<Show when=move || is_busy(pending.get())>
				<span class="pending">{move || format!("searching ({})", pending.get())}</span>
			</Show>
		</form>
	}
}
