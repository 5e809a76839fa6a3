//! Renders the subscription checklist as a single self-contained HTML
//! document: styling and interaction script are embedded, nothing is fetched
//! at generation or view time.
//!
//! Completion state lives in the viewer's browser under the localStorage key
//! `completed`, a JSON map from item index (string) to boolean. Item indexes
//! come from aggregator order, so the same input always produces the same
//! keys and saved progress survives re-generation.

use chrono::NaiveDate;

use crate::recurring::Subscription;
use crate::vendor::{self, VendorResolver};

/// The checklist shows at most this many subscriptions.
const MAX_ITEMS: usize = 30;

/// Each item lists at most this many recent charges.
const MAX_CHARGES_SHOWN: usize = 10;

pub(crate) fn render(
    subscriptions: &[Subscription],
    resolver: &VendorResolver,
    today: NaiveDate,
) -> String {
    let mut html = String::from(PAGE_HEAD);
    for (i, item) in subscriptions.iter().take(MAX_ITEMS).enumerate() {
        html.push_str(&render_item(i, item, resolver, today));
    }
    html.push_str(PAGE_TAIL);
    html
}

fn render_item(
    index: usize,
    item: &Subscription,
    resolver: &VendorResolver,
    today: NaiveDate,
) -> String {
    let merchant = escape(&item.merchant);
    let url = escape(&resolver.resolve(&item.merchant));
    let search = escape(&vendor::search_url(&item.merchant));
    let next_date = item.next_billing.format("%b %d, %Y");
    let next_date_iso = item.next_billing.format("%Y-%m-%d");
    let interval_days = item.avg_interval_days as i64;
    let urgency = urgency_class(item.next_billing, today);

    let mut charges_html = String::new();
    for charge in item.charges.iter().take(MAX_CHARGES_SHOWN) {
        charges_html.push_str(&format!(
            "<div class=\"charge-item\"><span class=\"charge-date\">{}</span><span class=\"charge-amount\">${:.2}</span></div>",
            charge.date.format("%b %d, %Y"),
            charge.amount.abs()
        ));
    }

    format!(
        r#"        <div class="item" data-id="{index}" data-amount="{avg:.2}" data-next-date="{next_date_iso}">
            <div class="top-row">
                <div class="merchant">{merchant}</div>
                <input type="checkbox" class="checkbox" onchange="toggleDone({index})">
            </div>
            <div class="details">
                <div class="detail"><span class="amount">${avg:.2}</span> avg</div>
                <div class="detail">{count} charges</div>
                <div class="detail">Every {interval_days} days</div>
                <div class="detail next {urgency}">Next: {next_date}</div>
            </div>
            <div class="buttons">
                <a href="{url}" target="_blank" class="btn-primary">Update Payment Method &rarr;</a>
                <a href="{search}" target="_blank" class="btn-secondary">Search Google</a>
            </div>
            <button class="toggle-charges" onclick="toggleCharges({index})">
                <span class="triangle" id="triangle-{index}"></span>
                <span>Show charges</span>
            </button>
            <div class="charges-list" id="charges-{index}">
                {charges_html}
            </div>
        </div>
"#,
        index = index,
        avg = item.avg_amount,
        next_date_iso = next_date_iso,
        merchant = merchant,
        count = item.count,
        interval_days = interval_days,
        urgency = urgency,
        next_date = next_date,
        url = url,
        search = search,
        charges_html = charges_html,
    )
}

/// Urgency of the predicted billing date relative to `today`: under a week
/// is urgent, under two weeks is soon.
fn urgency_class(next_billing: NaiveDate, today: NaiveDate) -> &'static str {
    let days_until = (next_billing - today).num_days();
    if days_until < 7 {
        "urgent"
    } else if days_until < 14 {
        "soon"
    } else {
        "ok"
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

static PAGE_HEAD: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Update Credit Card - Subscriptions</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; background: #f5f5f5; }
        .header { background: white; padding: 20px; border-bottom: 1px solid #e0e0e0; position: sticky; top: 0; z-index: 10; box-shadow: 0 2px 4px rgba(0,0,0,0.05); }
        h1 { font-size: 24px; color: #333; margin-bottom: 5px; }
        .progress { font-size: 14px; color: #666; margin-top: 8px; }
        .progress-bar { height: 6px; background: #e0e0e0; border-radius: 3px; margin-top: 8px; overflow: hidden; }
        .progress-fill { height: 100%; background: #4caf50; width: 0%; transition: width 0.3s; }
        .search-box { margin-top: 12px; position: relative; }
        .search-box input { width: 100%; padding: 10px; font-size: 14px; border: 1px solid #ddd; border-radius: 6px; box-sizing: border-box; }
        .search-box input:focus { outline: none; border-color: #1976d2; }
        .filter-count { font-size: 12px; color: #666; margin-top: 4px; }
        .sort-controls { margin-top: 12px; display: flex; gap: 8px; align-items: center; font-size: 14px; }
        .sort-controls label { color: #666; }
        .sort-controls select { padding: 6px 10px; border: 1px solid #ddd; border-radius: 4px; font-size: 14px; cursor: pointer; }
        .sort-controls select:focus { outline: none; border-color: #1976d2; }
        .list { max-width: 800px; margin: 0 auto; padding: 20px; }
        .item { background: white; padding: 20px; margin-bottom: 12px; border-radius: 8px; box-shadow: 0 1px 3px rgba(0,0,0,0.1); transition: all 0.3s; }
        .item.done { opacity: 0.5; }
        .item.done .merchant { text-decoration: line-through; }
        .top-row { display: flex; justify-content: space-between; align-items: start; margin-bottom: 12px; }
        .merchant { font-size: 18px; font-weight: 600; color: #1a1a1a; flex: 1; }
        .checkbox { width: 24px; height: 24px; cursor: pointer; margin-left: 12px; }
        .details { display: flex; gap: 20px; flex-wrap: wrap; margin-bottom: 12px; font-size: 14px; color: #666; }
        .detail { display: flex; align-items: center; gap: 6px; }
        .amount { color: #d32f2f; font-weight: 600; }
        .next { font-weight: 500; }
        .next.urgent { color: #d32f2f; }
        .next.soon { color: #f57c00; }
        .next.ok { color: #2e7d32; }
        .buttons { display: flex; gap: 10px; flex-wrap: wrap; }
        .buttons a { display: inline-block; padding: 10px 20px; color: white; text-decoration: none; border-radius: 6px; font-size: 14px; font-weight: 500; }
        .btn-primary { background: #1976d2; }
        .btn-primary:hover { background: #1565c0; }
        .btn-secondary { background: #757575; }
        .btn-secondary:hover { background: #616161; }
        .item.done .buttons a { background: #9e9e9e; pointer-events: none; }
        .toggle-charges { background: none; border: none; color: #1976d2; cursor: pointer; font-size: 14px; padding: 5px 0; display: flex; align-items: center; gap: 5px; margin-top: 8px; }
        .toggle-charges:hover { text-decoration: underline; }
        .triangle { display: inline-block; width: 0; height: 0; border-left: 5px solid transparent; border-right: 5px solid transparent; border-top: 6px solid #1976d2; transition: transform 0.2s; }
        .triangle.open { transform: rotate(180deg); }
        .charges-list { display: none; margin-top: 12px; padding: 12px; background: #f5f5f5; border-radius: 4px; font-size: 13px; }
        .charges-list.open { display: block; }
        .charge-item { padding: 6px 0; border-bottom: 1px solid #e0e0e0; display: flex; justify-content: space-between; }
        .charge-item:last-child { border-bottom: none; }
        .charge-date { color: #666; }
        .charge-amount { font-weight: 600; color: #d32f2f; }
    </style>
</head>
<body>
    <div class="header">
        <h1>Update Credit Card</h1>
        <div class="progress"><span id="done-count">0</span> of <span id="total-count">0</span> completed</div>
        <div class="progress-bar"><div class="progress-fill" id="progress-fill"></div></div>
        <div class="search-box">
            <input type="text" id="search" placeholder="Search subscriptions..." oninput="filterItems()">
            <div class="filter-count" id="filter-count"></div>
        </div>
        <div class="sort-controls">
            <label>Sort by:</label>
            <select id="sort-select" onchange="sortItems()">
                <option value="status">Status (incomplete first)</option>
                <option value="amount-high">Amount (high to low)</option>
                <option value="amount-low">Amount (low to high)</option>
                <option value="date-soon">Next billing (soonest first)</option>
                <option value="date-later">Next billing (latest first)</option>
            </select>
        </div>
    </div>
    <div class="list" id="list">
"##;

static PAGE_TAIL: &str = r##"    </div>
    <script>
        const total = document.querySelectorAll('.item').length;
        document.getElementById('total-count').textContent = total;

        // Restore saved progress from browser localStorage
        const saved = JSON.parse(localStorage.getItem('completed') || '{}');
        Object.keys(saved).forEach(id => {
            if (saved[id]) {
                const item = document.querySelector(`[data-id="${id}"]`);
                if (item) {
                    item.classList.add('done');
                    item.querySelector('.checkbox').checked = true;
                }
            }
        });
        sortItems();
        updateProgress();
        updateFilterCount();

        function toggleDone(id) {
            const item = document.querySelector(`[data-id="${id}"]`);
            const checkbox = item.querySelector('.checkbox');
            item.classList.toggle('done');

            const completed = JSON.parse(localStorage.getItem('completed') || '{}');
            completed[id] = checkbox.checked;
            localStorage.setItem('completed', JSON.stringify(completed));

            sortItems();
            updateProgress();
        }

        function toggleCharges(id) {
            document.getElementById('charges-' + id).classList.toggle('open');
            document.getElementById('triangle-' + id).classList.toggle('open');
        }

        function filterItems() {
            const query = document.getElementById('search').value.toLowerCase();
            document.querySelectorAll('.item').forEach(item => {
                const merchant = item.querySelector('.merchant').textContent.toLowerCase();
                item.style.display = merchant.includes(query) ? '' : 'none';
            });
            updateFilterCount();
        }

        function updateFilterCount() {
            const query = document.getElementById('search').value;
            const items = document.querySelectorAll('.item');
            const visible = Array.from(items).filter(item => item.style.display !== 'none').length;
            const countEl = document.getElementById('filter-count');
            countEl.textContent = query ? `Showing ${visible} of ${total} subscriptions` : '';
        }

        function sortItems() {
            const list = document.getElementById('list');
            const items = Array.from(list.querySelectorAll('.item'));
            const sortBy = document.getElementById('sort-select').value;

            items.sort((a, b) => {
                if (sortBy === 'status') {
                    const aDone = a.classList.contains('done');
                    const bDone = b.classList.contains('done');
                    if (aDone === bDone) return 0;
                    return aDone ? 1 : -1;
                } else if (sortBy === 'amount-high') {
                    return parseFloat(b.dataset.amount) - parseFloat(a.dataset.amount);
                } else if (sortBy === 'amount-low') {
                    return parseFloat(a.dataset.amount) - parseFloat(b.dataset.amount);
                } else if (sortBy === 'date-soon') {
                    return new Date(a.dataset.nextDate) - new Date(b.dataset.nextDate);
                } else if (sortBy === 'date-later') {
                    return new Date(b.dataset.nextDate) - new Date(a.dataset.nextDate);
                }
                return 0;
            });

            items.forEach(item => list.appendChild(item));
        }

        function updateProgress() {
            const done = document.querySelectorAll('.item.done').length;
            document.getElementById('done-count').textContent = done;
            document.getElementById('progress-fill').style.width = (done / total * 100) + '%';
        }
    </script>
</body>
</html>"##;
