/// Room-analysis prompt. The model must answer with bare JSON matching
/// `PlacementSuggestion`; all coordinates are percentages of the image.
pub const ROOM_ANALYSIS_PROMPT: &str = r#"You are a professional interior decorator. Analyze this room photo to find the BEST spot to hang artwork.

CRITICAL RULES - READ CAREFULLY:
1. NEVER place artwork overlapping ANY glass, windows, or doors - even partially
2. NEVER place artwork on door/window FRAMES or TRIM - those are part of the window/door area
3. Only place on SOLID OPAQUE WALL surfaces with actual wall texture/paint
4. If you can see through it (sky, outside, reflections), it's NOT a wall

STEP 1 - MAP ALL GLASS/WINDOWS/DOORS:
Scan left to right and list EVERY transparent or semi-transparent area:
- Include the full width of each window/door INCLUDING its frame/trim
- Glass French doors count as windows (entire door area is off-limits)
- Arched windows above doors are also off-limits

STEP 2 - IDENTIFY TRUE WALL SECTIONS:
After excluding all glass areas, find remaining SOLID wall:
- Must be actual painted/textured wall surface
- Must be at least 10% of image width
- NOT decorative trim or molding around windows

STEP 3 - CHOOSE BEST PLACEMENT:
If a suitable wall section exists:
- Center the painting on that wall section
- Size appropriately (not too large)
- Place at eye level (30-40% from top)

If NO suitable solid wall exists:
- Set "noSuitableWall": true
- Suggest a small painting on the best available narrow wall strip

Return JSON with ALL coordinates as PERCENTAGES (0-100) of image dimensions:
{
  "glassAreas": [{"left": <% from left>, "right": <% from left>, "type": "<window|door|french door>"}],
  "solidWallSections": [{"left": <% from left>, "right": <% from left>, "width": <% width>}],
  "noSuitableWall": <true|false>,
  "x": <% from left edge - where painting starts>,
  "y": <% from top edge - where painting starts>,
  "width": <% of image width>,
  "height": <% of image height>,
  "recommendedAspect": "<portrait|landscape|square>",
  "recommendedFrame": "<thin black|thin white|natural wood|ornate gold>",
  "needsMat": <true|false>,
  "reasoning": "<explanation of why this spot>"
}

Return ONLY valid JSON, no markdown."#;
